//! External collaborators of the pipeline.
//!
//! Speech recognition, document text extraction, audio extraction and result
//! storage sit behind traits so the orchestrator can be driven with any
//! implementation, including in-memory fakes in tests.

mod extract;
mod ffmpeg;
mod source;
mod storage;
mod whisper;

pub use extract::FileTextExtractor;
pub use ffmpeg::{probe_duration, split_audio, FfmpegAudioExtractor};
pub use source::SourceKind;
pub use storage::{create_blob_store, HttpBlobStore, LocalBlobStore};
pub use whisper::{create_transcriber, DummyTranscriber, WhisperTranscriber};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Converts speech audio to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Reads the text content of a document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<String>;
}

/// Pulls the audio track out of a video file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Write `source`'s audio to `dest` as mono WAV at `sample_rate` Hz.
    async fn extract_audio(&self, source: &Path, dest: &Path, sample_rate: u32) -> Result<()>;
}

/// Durable storage for job artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the file at `local_path` under `key` and return its location.
    async fn put(&self, local_path: &Path, key: &str) -> Result<String>;
}
