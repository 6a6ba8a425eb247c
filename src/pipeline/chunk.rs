//! Per-segment generation.

use super::{CallPolicy, ChunkResult};
use crate::chunking::Segment;
use crate::generation::ContentProvider;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Runs summarize, quiz and flashcard generation over one segment.
///
/// The three calls are independent: each goes through the [`CallPolicy`], so a
/// failed call is recorded in its own field and the remaining calls still run.
#[derive(Clone)]
pub struct ChunkProcessor {
    provider: Arc<dyn ContentProvider>,
    policy: CallPolicy,
}

impl ChunkProcessor {
    pub fn new(provider: Arc<dyn ContentProvider>, policy: CallPolicy) -> Self {
        Self { provider, policy }
    }

    #[instrument(skip_all, fields(segment = segment.index, chars = segment.text.len()))]
    pub async fn process(&self, segment: &Segment) -> ChunkResult {
        let text = segment.text.as_str();
        debug!("Processing segment with {}", self.provider.name());

        let summary = self
            .policy
            .call("summarize", || self.provider.summarize(text))
            .await;
        let quiz = self
            .policy
            .call("generate_quiz", || self.provider.generate_quiz(text))
            .await;
        let flashcards = self
            .policy
            .call("generate_flashcards", || self.provider.generate_flashcards(text))
            .await;

        ChunkResult {
            index: segment.index,
            summary,
            quiz,
            flashcards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Generated, ScriptedProvider};

    #[tokio::test]
    async fn test_all_three_capabilities_run() {
        let provider = Arc::new(ScriptedProvider::new());
        let processor = ChunkProcessor::new(provider.clone(), CallPolicy::default());

        let result = processor.process(&Segment::new(4, "Mitochondria make ATP.")).await;

        assert_eq!(result.index, 4);
        assert_eq!(result.summary, Generated::Ok("SUMMARY:Mitochondr".to_string()));
        assert!(result.quiz.is_ok());
        assert!(result.flashcards.is_ok());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_call_does_not_stop_siblings() {
        let provider = Arc::new(ScriptedProvider::new().fail_summary_on("ATP"));
        let processor = ChunkProcessor::new(provider.clone(), CallPolicy::default());

        let result = processor.process(&Segment::new(0, "Mitochondria make ATP.")).await;

        assert!(result.summary.error().unwrap().contains("scripted summarize failure"));
        assert!(result.quiz.is_ok());
        assert!(result.flashcards.is_ok());
        assert_eq!(provider.calls(), 3);
    }
}
