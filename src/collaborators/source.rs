//! Classification of uploaded artifacts by file extension.

use crate::error::{LectioError, Result};
use std::fmt;
use std::path::Path;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "pptx"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// How a transcript is derived from an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Audio track is extracted, then transcribed.
    Video,
    /// Transcribed directly.
    Audio,
    /// Slide deck or PDF; text is extracted.
    Document,
    /// Plain text or markdown, read as-is.
    Text,
}

impl SourceKind {
    /// Classify a file by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let kind = if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Document
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Text
        } else {
            return Err(LectioError::UnsupportedFormat(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ));
        };

        Ok(kind)
    }

    /// Whether the transcript comes from speech recognition.
    pub fn needs_transcription(&self) -> bool {
        matches!(self, SourceKind::Video | SourceKind::Audio)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Video => "video",
            SourceKind::Audio => "audio",
            SourceKind::Document => "document",
            SourceKind::Text => "text",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let cases = [
            ("lecture.MP4", SourceKind::Video),
            ("clip.webm", SourceKind::Video),
            ("talk.mp3", SourceKind::Audio),
            ("talk.flac", SourceKind::Audio),
            ("slides.pptx", SourceKind::Document),
            ("notes.PDF", SourceKind::Document),
            ("notes.md", SourceKind::Text),
            ("/tmp/x/transcript.txt", SourceKind::Text),
        ];
        for (name, expected) in cases {
            assert_eq!(SourceKind::from_path(Path::new(name)).unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn test_unsupported() {
        let err = SourceKind::from_path(Path::new("archive.zip")).unwrap_err();
        assert!(matches!(err, LectioError::UnsupportedFormat(ref n) if n == "archive.zip"));
        assert!(SourceKind::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_needs_transcription() {
        assert!(SourceKind::Video.needs_transcription());
        assert!(SourceKind::Audio.needs_transcription());
        assert!(!SourceKind::Document.needs_transcription());
        assert!(!SourceKind::Text.needs_transcription());
    }
}
