//! Configuration settings for Lectio.

use crate::chunking::SizeBudget;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub pipeline: PipelineSettings,
    pub provider: ProviderSettings,
    pub transcription: TranscriptionSettings,
    pub storage: StorageSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where uploaded artifacts are written, one file per job.
    pub upload_dir: String,
    /// Directory for per-job temporary files (extracted audio, result drafts).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            upload_dir: "/tmp/lectio/uploads".to_string(),
            temp_dir: "/tmp/lectio/work".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chunk-and-reduce pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Maximum segment size in characters, used for both segmentation passes.
    pub max_segment_chars: usize,
    /// Maximum number of segments processed at the same time.
    pub max_concurrent_segments: usize,
    /// Upper bound for a single provider call, in seconds.
    pub call_timeout_secs: u64,
    /// Extra attempts for a failed provider call (0 = no retry).
    pub max_retries: u32,
    /// Delay between retry attempts, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Pause after each provider call within a segment, in milliseconds.
    pub call_spacing_ms: u64,
    /// Locales used when a job does not request any.
    pub default_locales: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_segment_chars: 1600,
            max_concurrent_segments: 4,
            call_timeout_secs: 120,
            max_retries: 0,
            retry_backoff_ms: 1000,
            call_spacing_ms: 0,
            default_locales: vec!["hi-IN".to_string()],
        }
    }
}

impl PipelineSettings {
    /// Segment size budget shared by segmentation and reduction.
    pub fn budget(&self) -> SizeBudget {
        SizeBudget::Chars(self.max_segment_chars)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Content generation backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions.
    #[default]
    OpenAI,
    /// Google Gemini `generateContent` REST API.
    Gemini,
    /// Deterministic offline provider.
    Dummy,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "dummy" | "offline" => Ok(ProviderKind::Dummy),
            _ => Err(format!("Unknown content provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Dummy => write!(f, "dummy"),
        }
    }
}

/// Content provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Backend (openai, gemini, dummy).
    pub kind: ProviderKind,
    /// Model name passed to the backend. None = backend default.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Environment variable holding the API key. Empty = backend default.
    pub api_key_env: String,
    /// Number of quiz questions requested per segment.
    pub quiz_count: usize,
    /// Number of flashcards requested per segment.
    pub flashcard_count: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAI,
            model: None,
            temperature: 0.3,
            api_key_env: String::new(),
            quiz_count: 5,
            flashcard_count: 5,
        }
    }
}

impl ProviderSettings {
    /// The configured model, or the backend's default.
    pub fn resolved_model(&self) -> String {
        if let Some(model) = self.model.as_ref().filter(|m| !m.is_empty()) {
            return model.clone();
        }
        match self.kind {
            ProviderKind::OpenAI => "gpt-4o-mini".to_string(),
            ProviderKind::Gemini => "gemini-1.5-pro-latest".to_string(),
            ProviderKind::Dummy => "dummy".to_string(),
        }
    }

    /// Resolve the API key from the configured environment variable, if any.
    pub fn api_key(&self) -> Option<String> {
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Transcription backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriberKind {
    /// OpenAI Whisper.
    #[default]
    Whisper,
    /// Fixed placeholder transcript, for offline runs.
    Dummy,
}

impl std::str::FromStr for TranscriberKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whisper" | "openai" => Ok(TranscriberKind::Whisper),
            "dummy" => Ok(TranscriberKind::Dummy),
            _ => Err(format!("Unknown transcriber: {}", s)),
        }
    }
}

/// Transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcriber (whisper, dummy).
    pub kind: TranscriberKind,
    /// Whisper model to use.
    pub model: String,
    /// Sample rate for audio extracted from video containers.
    pub sample_rate: u32,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent audio chunk uploads.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            kind: TranscriberKind::Whisper,
            model: "whisper-1".to_string(),
            sample_rate: 16000,
            chunk_duration_seconds: 600,
            max_concurrent_chunks: 3,
        }
    }
}

/// Blob storage backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Copy results into a local directory.
    #[default]
    Local,
    /// HTTP PUT to an object store endpoint.
    Http,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "fs" => Ok(StorageKind::Local),
            "http" | "https" => Ok(StorageKind::Http),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Result storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend (local, http).
    pub kind: StorageKind,
    /// Root directory for the local backend.
    pub local_root: String,
    /// Base URL for the http backend, e.g. a bucket endpoint.
    pub base_url: String,
    /// Environment variable holding a bearer token for the http backend.
    pub token_env: String,
    /// Also store the raw transcript next to the result.
    pub store_transcript: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            kind: StorageKind::Local,
            local_root: "~/.lectio/store".to_string(),
            base_url: String::new(),
            token_env: "LECTIO_STORAGE_TOKEN".to_string(),
            store_transcript: false,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::LectioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::LectioError;

        if self.pipeline.max_segment_chars == 0 {
            return Err(LectioError::Config(
                "pipeline.max_segment_chars must be greater than zero".to_string(),
            ));
        }
        if self.pipeline.max_concurrent_segments == 0 {
            return Err(LectioError::Config(
                "pipeline.max_concurrent_segments must be greater than zero".to_string(),
            ));
        }
        if self.storage.kind == StorageKind::Http && self.storage.base_url.is_empty() {
            return Err(LectioError::Config(
                "storage.base_url is required for the http backend".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lectio")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded upload directory path.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.upload_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded local storage root.
    pub fn storage_root(&self) -> PathBuf {
        Self::expand_path(&self.storage.local_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [pipeline]
            max_segment_chars = 4000
            default_locales = ["hi-IN", "es-ES"]

            [provider]
            kind = "gemini"
            "#,
        )
        .unwrap();

        assert_eq!(settings.pipeline.max_segment_chars, 4000);
        assert_eq!(settings.pipeline.max_concurrent_segments, 4);
        assert_eq!(settings.pipeline.default_locales, vec!["hi-IN", "es-ES"]);
        assert_eq!(settings.provider.kind, ProviderKind::Gemini);
        assert_eq!(settings.provider.resolved_model(), "gemini-1.5-pro-latest");
        assert_eq!(settings.transcription.sample_rate, 16000);
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut settings = Settings::default();
        settings.pipeline.max_segment_chars = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_http_storage_requires_base_url() {
        let mut settings = Settings::default();
        settings.storage.kind = StorageKind::Http;
        assert!(settings.validate().is_err());

        settings.storage.base_url = "https://store.example.com/bucket".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.provider.kind = ProviderKind::Dummy;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.provider.kind, ProviderKind::Dummy);
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("bogus".parse::<ProviderKind>().is_err());
    }
}
