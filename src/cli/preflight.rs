//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a job that would otherwise fail midway.

use crate::collaborators::SourceKind;
use crate::config::{ProviderKind, Settings, TranscriberKind};
use crate::error::{LectioError, Result};
use std::path::Path;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Processing a single file of a known kind.
    Process(SourceKind),
    /// Serving uploads of any kind, media included.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_provider_key(settings)?;

    let transcribes = match operation {
        Operation::Process(kind) => kind.needs_transcription(),
        Operation::Serve => true,
    };
    if transcribes && settings.transcription.kind == TranscriberKind::Whisper {
        check_openai_key()?;
    }

    for tool in required_tools(operation, settings) {
        check_tool(tool)?;
    }
    Ok(())
}

/// Pre-flight for processing the file at `path`.
pub fn check_file(path: &Path, settings: &Settings) -> Result<()> {
    if !path.exists() {
        return Err(LectioError::InvalidInput(format!("File not found: {}", path.display())));
    }
    check(Operation::Process(SourceKind::from_path(path)?), settings)?;

    if let Some(tool) = document_tool(path) {
        check_tool(tool)?;
    }
    Ok(())
}

/// The extraction tool a document needs, if any.
pub fn document_tool(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("pdftotext"),
        "pptx" => Some("unzip"),
        _ => None,
    }
}

/// External tools an operation depends on.
pub fn required_tools(operation: Operation, settings: &Settings) -> Vec<&'static str> {
    let whisper = settings.transcription.kind == TranscriberKind::Whisper;
    match operation {
        Operation::Process(SourceKind::Video) if whisper => vec!["ffmpeg", "ffprobe"],
        Operation::Process(SourceKind::Video) => vec!["ffmpeg"],
        Operation::Process(SourceKind::Audio) if whisper => vec!["ffmpeg", "ffprobe"],
        Operation::Process(SourceKind::Audio) => vec![],
        // Documents depend on their extension, see `document_tool`
        Operation::Process(SourceKind::Document) => vec![],
        Operation::Process(SourceKind::Text) => vec![],
        // Any upload may be media; document tools are checked per job
        Operation::Serve if whisper => vec!["ffmpeg", "ffprobe"],
        Operation::Serve => vec![],
    }
}

/// Check that the configured content provider has credentials.
fn check_provider_key(settings: &Settings) -> Result<()> {
    if settings.provider.api_key().is_some() {
        return Ok(());
    }
    match settings.provider.kind {
        ProviderKind::OpenAI => check_openai_key(),
        ProviderKind::Gemini => match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(()),
            _ => Err(LectioError::Config(
                "GEMINI_API_KEY not set. Set it with: export GEMINI_API_KEY='...'".to_string(),
            )),
        },
        ProviderKind::Dummy => Ok(()),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(LectioError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(LectioError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe/pdftotext use -v style flags, unzip prints usage with -v
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        "pdftotext" | "unzip" => "-v",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(_) if matches!(name, "pdftotext" | "unzip") => Ok(()),
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(LectioError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LectioError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(LectioError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> Settings {
        let mut settings = Settings::default();
        settings.provider.kind = ProviderKind::Dummy;
        settings.transcription.kind = TranscriberKind::Dummy;
        settings
    }

    #[test]
    fn test_offline_text_has_no_requirements() {
        assert!(check(Operation::Process(SourceKind::Text), &offline()).is_ok());
        assert!(check(Operation::Serve, &offline()).is_ok());
    }

    #[test]
    fn test_required_tools() {
        let settings = Settings::default();
        assert_eq!(
            required_tools(Operation::Process(SourceKind::Video), &settings),
            vec!["ffmpeg", "ffprobe"]
        );
        assert_eq!(
            required_tools(Operation::Process(SourceKind::Video), &offline()),
            vec!["ffmpeg"]
        );
        assert!(required_tools(Operation::Process(SourceKind::Audio), &offline()).is_empty());
        assert!(required_tools(Operation::Process(SourceKind::Text), &settings).is_empty());
        assert_eq!(required_tools(Operation::Serve, &settings), vec!["ffmpeg", "ffprobe"]);
        assert!(required_tools(Operation::Serve, &offline()).is_empty());
    }

    #[test]
    fn test_serve_requires_provider_credentials() {
        let mut settings = offline();
        settings.provider.kind = ProviderKind::Gemini;
        settings.provider.api_key_env = "LECTIO_TEST_UNSET_GEMINI_KEY".to_string();
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(matches!(
                check(Operation::Serve, &settings),
                Err(LectioError::Config(_))
            ));
        }
    }

    #[test]
    fn test_document_tool() {
        assert_eq!(document_tool(Path::new("a.PDF")), Some("pdftotext"));
        assert_eq!(document_tool(Path::new("deck.pptx")), Some("unzip"));
        assert_eq!(document_tool(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_check_file_rejects_missing_and_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_file(&dir.path().join("missing.txt"), &offline()).is_err());

        let zip = dir.path().join("a.zip");
        std::fs::write(&zip, "PK").unwrap();
        assert!(matches!(
            check_file(&zip, &offline()),
            Err(LectioError::UnsupportedFormat(_))
        ));
    }
}
