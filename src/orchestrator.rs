//! Pipeline driver.
//!
//! Takes one uploaded artifact from raw file to stored result:
//! transcript, segmentation, fan-out, reduction, localization, storage.

use crate::chunking::segment;
use crate::collaborators::{
    create_blob_store, create_transcriber, AudioExtractor, BlobStore, FfmpegAudioExtractor,
    FileTextExtractor, SourceKind, TextExtractor, Transcriber,
};
use crate::config::{Prompts, Settings};
use crate::error::{LectioError, Result};
use crate::generation::{create_provider, ContentProvider};
use crate::job::Job;
use crate::pipeline::{
    panic_message, AggregatedResult, CallPolicy, ChunkProcessor, FanOut, Localizer, Reducer,
};
use futures::FutureExt;
use indicatif::ProgressBar;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Lectio pipeline.
pub struct Orchestrator {
    settings: Settings,
    provider: Arc<dyn ContentProvider>,
    transcriber: Arc<dyn Transcriber>,
    text_extractor: Arc<dyn TextExtractor>,
    audio_extractor: Arc<dyn AudioExtractor>,
    blob_store: Arc<dyn BlobStore>,
    progress: Option<ProgressBar>,
}

/// Outcome of [`Orchestrator::run`].
#[derive(Debug)]
pub struct JobOutcome {
    /// The job in its terminal state.
    pub job: Job,
    /// The aggregated result, present only when the job is done.
    pub result: Option<AggregatedResult>,
}

impl Orchestrator {
    /// Create an orchestrator with the collaborators selected in `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let provider = create_provider(&settings.provider, prompts, settings.pipeline.call_timeout())?;
        info!("Using {} content provider", provider.name());

        let transcriber = create_transcriber(&settings.transcription)?;
        let blob_store = create_blob_store(&settings)?;

        Self::with_components(
            settings,
            provider,
            transcriber,
            Arc::new(FileTextExtractor::new()),
            Arc::new(FfmpegAudioExtractor::new()),
            blob_store,
        )
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        provider: Arc<dyn ContentProvider>,
        transcriber: Arc<dyn Transcriber>,
        text_extractor: Arc<dyn TextExtractor>,
        audio_extractor: Arc<dyn AudioExtractor>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        settings.validate()?;
        std::fs::create_dir_all(settings.temp_dir())?;

        Ok(Self {
            settings,
            provider,
            transcriber,
            text_extractor,
            audio_extractor,
            blob_store,
            progress: None,
        })
    }

    /// Report per-segment progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a job for `path` and run it.
    pub async fn process_file(&self, path: &Path, locales: &[String]) -> JobOutcome {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.run(Job::new(filename), path, locales).await
    }

    /// Drive `job` to a terminal state.
    ///
    /// Never returns an error: anything that escapes the pipeline, panics
    /// included, marks the job failed with the error's message. Temporary
    /// files are always removed.
    #[instrument(skip(self, job, path, locales), fields(job_id = %job.id, path = %path.display()))]
    pub async fn run(&self, mut job: Job, path: &Path, locales: &[String]) -> JobOutcome {
        let work_dir = self.settings.temp_dir().join(job.id.to_string());

        let outcome = match job.start() {
            Ok(()) => AssertUnwindSafe(self.execute(&job, path, &work_dir, locales))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(LectioError::Aborted(panic_message(panic.as_ref())))),
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok((result, location)) => match job.complete(location) {
                Ok(()) => {
                    info!("Job done: {}", job.result_location().unwrap_or_default());
                    Some(result)
                }
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Job failed: {}", e);
                if let Err(transition) = job.fail(e.to_string()) {
                    warn!("{}", transition);
                }
                None
            }
        };

        if work_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
                warn!("Failed to clean up {:?}: {}", work_dir, e);
            }
        }

        JobOutcome { job, result }
    }

    async fn execute(
        &self,
        job: &Job,
        path: &Path,
        work_dir: &Path,
        locales: &[String],
    ) -> Result<(AggregatedResult, String)> {
        tokio::fs::create_dir_all(work_dir).await?;

        let transcript = self.transcript_for(path, work_dir).await?;
        info!("Transcript has {} characters", transcript.chars().count());

        if self.settings.storage.store_transcript {
            let transcript_path = work_dir.join("transcript.txt");
            tokio::fs::write(&transcript_path, &transcript).await?;
            self.blob_store
                .put(&transcript_path, &format!("transcripts/{}.txt", job.id))
                .await?;
        }

        let result = self.generate(&transcript, locales).await?;

        let result_path = work_dir.join("result.json");
        tokio::fs::write(&result_path, serde_json::to_string_pretty(&result)?).await?;
        let location = self
            .blob_store
            .put(&result_path, &result_key(job))
            .await?;

        Ok((result, location))
    }

    /// Derive the transcript of a source file.
    async fn transcript_for(&self, path: &Path, work_dir: &Path) -> Result<String> {
        if !path.exists() {
            return Err(LectioError::InvalidInput(format!("File not found: {}", path.display())));
        }

        let kind = SourceKind::from_path(path)?;
        info!("Preparing {} source", kind);

        match kind {
            SourceKind::Video => {
                let audio_path: PathBuf = work_dir.join("audio.wav");
                self.audio_extractor
                    .extract_audio(path, &audio_path, self.settings.transcription.sample_rate)
                    .await?;
                self.transcriber.transcribe(&audio_path).await
            }
            SourceKind::Audio => self.transcriber.transcribe(path).await,
            SourceKind::Document | SourceKind::Text => self.text_extractor.extract(path).await,
        }
    }

    /// Run segmentation, fan-out, reduction and localization over a transcript.
    pub async fn generate(&self, transcript: &str, locales: &[String]) -> Result<AggregatedResult> {
        let pipeline = &self.settings.pipeline;
        let policy = CallPolicy::from_settings(pipeline);

        let segments = segment(transcript, pipeline.budget())?;
        info!("Split transcript into {} segments", segments.len());

        let mut fanout = FanOut::new(
            ChunkProcessor::new(self.provider.clone(), policy.clone()),
            pipeline.max_concurrent_segments,
        );
        if let Some(pb) = &self.progress {
            pb.set_length(segments.len() as u64);
            pb.set_position(0);
            fanout = fanout.with_progress(pb.clone());
        }
        let chunk_results = fanout.run(&segments).await;

        let reducer = Reducer::new(self.provider.clone(), policy.clone(), pipeline.budget());
        let reduction = reducer.reduce(&chunk_results).await?;

        let localizer = Localizer::new(self.provider.clone(), policy, pipeline.default_locales.clone());
        let localized = localizer.localize_all(&reduction.summary, locales).await;

        Ok(AggregatedResult::from_parts(reduction, localized))
    }
}

/// Storage key of a job's result.
pub fn result_key(job: &Job) -> String {
    format!("results/{}.json", job.id)
}
