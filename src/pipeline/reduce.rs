//! Reduction of per-segment results into one document-level result.

use super::{CallPolicy, ChunkResult, StageFailure, SummaryStage};
use crate::chunking::{segment, Segment, SizeBudget};
use crate::error::Result;
use crate::generation::{ContentProvider, Flashcard, Generated, QuizItem};
use std::sync::Arc;
use tracing::{info, instrument};

/// Separator used between summaries and between compressed parts.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Output of [`Reducer::reduce`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub summary: String,
    pub quizzes: Vec<Generated<QuizItem>>,
    pub flashcards: Vec<Generated<Flashcard>>,
    pub summary_failures: Vec<StageFailure>,
}

/// Merges chunk results: summaries are re-segmented and summarized again,
/// quiz and flashcard lists are concatenated in segment order.
pub struct Reducer {
    provider: Arc<dyn ContentProvider>,
    policy: CallPolicy,
    budget: SizeBudget,
}

impl Reducer {
    pub fn new(provider: Arc<dyn ContentProvider>, policy: CallPolicy, budget: SizeBudget) -> Self {
        Self {
            provider,
            policy,
            budget,
        }
    }

    /// Join the successful per-segment summaries, in segment order.
    pub fn intermediate_text(results: &[ChunkResult]) -> String {
        results
            .iter()
            .filter_map(|r| r.summary.as_ok())
            .filter(|s| !s.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }

    /// The segments the second summarization pass will run over.
    pub fn reduction_segments(&self, results: &[ChunkResult]) -> Result<Vec<Segment>> {
        segment(&Self::intermediate_text(results), self.budget)
    }

    #[instrument(skip_all, fields(chunks = results.len()))]
    pub async fn reduce(&self, results: &[ChunkResult]) -> Result<Reduction> {
        let mut summary_failures: Vec<StageFailure> = results
            .iter()
            .filter_map(|r| {
                r.summary.error().map(|e| StageFailure {
                    stage: SummaryStage::Segment,
                    index: r.index,
                    error: e.to_string(),
                })
            })
            .collect();

        let parts = self.reduction_segments(results)?;
        info!("Reducing {} summaries into {} parts", results.len(), parts.len());

        let mut compressed = Vec::with_capacity(parts.len());
        for part in &parts {
            let outcome = self
                .policy
                .call("summarize (reduce)", || self.provider.summarize(&part.text))
                .await;
            match outcome {
                Generated::Ok(text) => compressed.push(text),
                Generated::Failed(f) => summary_failures.push(StageFailure {
                    stage: SummaryStage::Reduce,
                    index: part.index,
                    error: f.error,
                }),
            }
        }

        let mut quizzes = Vec::new();
        let mut flashcards = Vec::new();
        for result in results {
            match &result.quiz {
                Generated::Ok(items) => quizzes.extend(items.iter().cloned().map(Generated::Ok)),
                Generated::Failed(f) => quizzes.push(Generated::Failed(f.clone())),
            }
            match &result.flashcards {
                Generated::Ok(cards) => flashcards.extend(cards.iter().cloned().map(Generated::Ok)),
                Generated::Failed(f) => flashcards.push(Generated::Failed(f.clone())),
            }
        }

        Ok(Reduction {
            summary: compressed.join(PARAGRAPH_SEPARATOR),
            quizzes,
            flashcards,
            summary_failures,
        })
    }
}
