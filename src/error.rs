//! Error types for Lectio.

use thiserror::Error;

/// Library-level error type for Lectio operations.
#[derive(Error, Debug)]
pub enum LectioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Job aborted: {0}")]
    Aborted(String),

    #[error("Invalid job transition: {0}")]
    InvalidTransition(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Lectio operations.
pub type Result<T> = std::result::Result<T, LectioError>;
