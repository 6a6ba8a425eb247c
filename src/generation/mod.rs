//! Content generation capabilities.
//!
//! The pipeline only ever talks to a [`ContentProvider`]. Concrete backends are
//! chosen once, at startup, by [`create_provider`].

mod dummy;
mod gemini;
mod openai;
mod parse;
mod prompted;
#[cfg(test)]
pub mod scripted;

pub use dummy::DummyProvider;
pub use gemini::GeminiBackend;
pub use openai::OpenAIBackend;
pub use parse::parse_items;
pub use prompted::{ChatBackend, PromptedProvider};
#[cfg(test)]
pub use scripted::ScriptedProvider;

use crate::config::{Prompts, ProviderKind, ProviderSettings};
use crate::error::{LectioError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A multiple-choice question.
///
/// Backends fall back to [`QuizItem::Raw`] when the model output could not be
/// parsed into structured questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizItem {
    Structured {
        question: String,
        options: Vec<String>,
        /// Index into `options` of the correct answer.
        answer: usize,
    },
    Raw {
        raw: String,
    },
}

/// A question/answer study card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flashcard {
    Structured { question: String, answer: String },
    Raw { raw: String },
}

/// Failure information carried in place of generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub error: String,
}

/// Outcome of a single provider call.
///
/// Serialized untagged: a successful value is written as-is, a failure as
/// `{"error": "..."}`, so generated text can never be mistaken for a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Generated<T> {
    Ok(T),
    Failed(Failure),
}

impl<T> Generated<T> {
    /// Build a failure from any displayable reason.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Generated::Failed(Failure {
            error: reason.to_string(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Generated::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Generated::Failed(_))
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Generated::Ok(value) => Some(value),
            Generated::Failed(_) => None,
        }
    }

    pub fn into_ok(self) -> Option<T> {
        match self {
            Generated::Ok(value) => Some(value),
            Generated::Failed(_) => None,
        }
    }

    /// The failure reason, if this call failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Generated::Ok(_) => None,
            Generated::Failed(f) => Some(&f.error),
        }
    }
}

impl<T> From<Result<T>> for Generated<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Generated::Ok(value),
            Err(e) => Generated::failed(e),
        }
    }
}

/// Capability interface over a generative backend.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Condense a text. Returns an empty string for blank input.
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Generate multiple-choice questions about a text.
    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizItem>>;

    /// Generate question/answer flashcards about a text.
    async fn generate_flashcards(&self, text: &str) -> Result<Vec<Flashcard>>;

    /// Translate and adapt a text for the given locale (e.g. `hi-IN`).
    async fn localize(&self, text: &str, locale: &str) -> Result<String>;
}

/// Build the provider selected in the settings.
pub fn create_provider(
    settings: &ProviderSettings,
    prompts: Prompts,
    timeout: std::time::Duration,
) -> Result<Arc<dyn ContentProvider>> {
    let model = settings.resolved_model();

    let provider: Arc<dyn ContentProvider> = match settings.kind {
        ProviderKind::OpenAI => {
            let backend = OpenAIBackend::new(&model, settings.temperature, settings.api_key(), timeout)?;
            Arc::new(PromptedProvider::new(backend, prompts, settings))
        }
        ProviderKind::Gemini => {
            let api_key = settings
                .api_key()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()))
                .ok_or_else(|| {
                    LectioError::Config(
                        "GEMINI_API_KEY not set. Set it with: export GEMINI_API_KEY='...'".to_string(),
                    )
                })?;
            let backend = GeminiBackend::new(&model, settings.temperature, api_key, timeout)?;
            Arc::new(PromptedProvider::new(backend, prompts, settings))
        }
        ProviderKind::Dummy => Arc::new(DummyProvider::new()),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_serializes_untagged() {
        let ok: Generated<String> = Generated::Ok("ERROR: not really an error".to_string());
        let failed: Generated<String> = Generated::failed("rate limited");

        assert_eq!(serde_json::to_string(&ok).unwrap(), r#""ERROR: not really an error""#);
        assert_eq!(serde_json::to_string(&failed).unwrap(), r#"{"error":"rate limited"}"#);

        let back: Generated<String> = serde_json::from_str(r#"{"error":"rate limited"}"#).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_quiz_item_shapes() {
        let items: Vec<Generated<QuizItem>> = serde_json::from_str(
            r#"[
                {"question": "2+2?", "options": ["3", "4"], "answer": 1},
                {"raw": "unparsed model output"},
                {"error": "timeout"}
            ]"#,
        )
        .unwrap();

        assert!(matches!(items[0], Generated::Ok(QuizItem::Structured { answer: 1, .. })));
        assert!(matches!(items[1], Generated::Ok(QuizItem::Raw { .. })));
        assert_eq!(items[2].error(), Some("timeout"));
    }

    #[test]
    fn test_from_result() {
        let ok: Generated<u32> = Ok(3).into();
        assert_eq!(ok.as_ok(), Some(&3));

        let err: Generated<u32> = Err(LectioError::Provider("boom".to_string())).into();
        assert!(err.is_failed());
        assert_eq!(err.error(), Some("Provider error: boom"));
    }

    #[tokio::test]
    async fn test_create_dummy_provider() {
        let settings = ProviderSettings {
            kind: ProviderKind::Dummy,
            ..Default::default()
        };
        let provider =
            create_provider(&settings, Prompts::default(), std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(provider.name(), "dummy");
        assert!(provider.summarize("").await.is_ok());
    }
}
