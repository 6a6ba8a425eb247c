//! Speech-to-text backends.

use super::ffmpeg::split_audio;
use super::Transcriber;
use crate::config::{TranscriberKind, TranscriptionSettings};
use crate::error::{LectioError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// OpenAI Whisper transcriber.
///
/// Audio longer than `chunk_duration_seconds` is split with ffmpeg and the
/// pieces are transcribed concurrently, then joined in playback order.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
}

impl WhisperTranscriber {
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: settings.model.clone(),
            chunk_duration_seconds: settings.chunk_duration_seconds,
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
        })
    }

    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio with {}", self.model);

        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.wav")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| LectioError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| LectioError::OpenAI(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let temp_dir = tempfile::tempdir()?;
        let pieces = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if pieces.len() == 1 {
            return self.transcribe_single(audio_path).await;
        }

        info!("Transcribing {} audio pieces with {}", pieces.len(), self.model);

        let mut results: Vec<(usize, Result<String>)> = stream::iter(pieces.into_iter().enumerate())
            .map(|(idx, piece)| async move { (idx, self.transcribe_single(&piece).await) })
            .buffer_unordered(self.max_concurrent_chunks)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);

        let mut texts = Vec::with_capacity(results.len());
        for (idx, result) in results {
            let text = result
                .map_err(|e| LectioError::Transcription(format!("Audio piece {} failed: {}", idx, e)))?;
            if !text.is_empty() {
                texts.push(text);
            }
        }

        Ok(texts.join(" "))
    }
}

/// Transcriber that returns a fixed text, for offline runs.
#[derive(Debug, Clone)]
pub struct DummyTranscriber {
    text: String,
}

impl DummyTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for DummyTranscriber {
    fn default() -> Self {
        Self::new("This is a dummy transcript. No speech recognition was performed.")
    }
}

#[async_trait]
impl Transcriber for DummyTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        debug!("Dummy transcription of {:?}", audio_path);
        Ok(self.text.clone())
    }
}

/// Build the transcriber selected in the settings.
pub fn create_transcriber(settings: &TranscriptionSettings) -> Result<Arc<dyn Transcriber>> {
    let transcriber: Arc<dyn Transcriber> = match settings.kind {
        TranscriberKind::Whisper => Arc::new(WhisperTranscriber::new(settings)?),
        TranscriberKind::Dummy => Arc::new(DummyTranscriber::default()),
    };
    Ok(transcriber)
}
