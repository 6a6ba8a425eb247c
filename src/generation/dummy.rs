//! Deterministic offline provider.
//!
//! Produces fixed-shape content without any network access. Useful for local runs
//! and for exercising the pipeline end to end.

use super::{ContentProvider, Flashcard, QuizItem};
use crate::error::Result;
use async_trait::async_trait;

/// Maximum characters kept from the input when building a dummy summary.
const SUMMARY_PREVIEW_CHARS: usize = 160;

/// Provider that derives its output directly from the input text.
pub struct DummyProvider;

impl DummyProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// First sentence of the text, capped in length.
fn lead(text: &str) -> String {
    let trimmed = text.trim();
    let sentence = match trimmed.find(". ") {
        Some(pos) => &trimmed[..=pos],
        None => trimmed,
    };
    sentence.chars().take(SUMMARY_PREVIEW_CHARS).collect()
}

#[async_trait]
impl ContentProvider for DummyProvider {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        Ok(format!("Summary: {}", lead(text)))
    }

    async fn generate_quiz(&self, text: &str) -> Result<Vec<QuizItem>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![QuizItem::Structured {
            question: format!("Which statement appears in the material? ({})", lead(text)),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: 0,
        }])
    }

    async fn generate_flashcards(&self, text: &str) -> Result<Vec<Flashcard>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Flashcard::Structured {
            question: "What is the key point of this section?".to_string(),
            answer: lead(text),
        }])
    }

    async fn localize(&self, text: &str, locale: &str) -> Result<String> {
        Ok(format!("[Localized to {}]: {}", locale, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_is_deterministic() {
        let provider = DummyProvider::new();
        let text = "Photosynthesis converts light to energy. It happens in chloroplasts.";

        let a = provider.summarize(text).await.unwrap();
        let b = provider.summarize(text).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "Summary: Photosynthesis converts light to energy.");
    }

    #[tokio::test]
    async fn test_dummy_handles_blank_input() {
        let provider = DummyProvider::new();
        assert_eq!(provider.summarize("").await.unwrap(), "");
        assert!(provider.generate_quiz(" ").await.unwrap().is_empty());
        assert!(provider.generate_flashcards("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dummy_localize_tags_locale() {
        let provider = DummyProvider::new();
        let out = provider.localize("Hello", "hi-IN").await.unwrap();
        assert_eq!(out, "[Localized to hi-IN]: Hello");
    }
}
