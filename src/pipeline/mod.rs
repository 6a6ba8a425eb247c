//! The chunk-and-reduce pipeline.
//!
//! A transcript is segmented, every segment is processed concurrently by a
//! [`FanOut`], the per-segment results are merged by a [`Reducer`] and the
//! merged summary is translated by a [`Localizer`]. Individual provider
//! failures never abort the pipeline; they are carried as [`Generated::Failed`].

mod chunk;
mod fanout;
mod localize;
mod policy;
mod reduce;

pub use chunk::ChunkProcessor;
pub use fanout::FanOut;
pub use localize::Localizer;
pub use policy::CallPolicy;
pub(crate) use policy::panic_message;
pub use reduce::{Reducer, Reduction, PARAGRAPH_SEPARATOR};

use crate::generation::{Flashcard, Generated, QuizItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generated content for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub index: usize,
    pub summary: Generated<String>,
    pub quiz: Generated<Vec<QuizItem>>,
    pub flashcards: Generated<Vec<Flashcard>>,
}

impl ChunkResult {
    /// A result whose three fields all carry the same failure.
    pub fn failed(index: usize, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            index,
            summary: Generated::failed(&reason),
            quiz: Generated::failed(&reason),
            flashcards: Generated::failed(&reason),
        }
    }
}

/// Which summarization pass a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStage {
    /// Per-segment summary of the transcript.
    Segment,
    /// Second pass over the concatenated summaries.
    Reduce,
}

/// A summary call whose output was left out of the final summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: SummaryStage,
    pub index: usize,
    pub error: String,
}

/// The document-level result of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub summary: String,
    pub quizzes: Vec<Generated<QuizItem>>,
    pub flashcards: Vec<Generated<Flashcard>>,
    /// Locale code to localized summary.
    pub localized: HashMap<String, Generated<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary_failures: Vec<StageFailure>,
}

impl AggregatedResult {
    pub fn from_parts(reduction: Reduction, localized: HashMap<String, Generated<String>>) -> Self {
        Self {
            summary: reduction.summary,
            quizzes: reduction.quizzes,
            flashcards: reduction.flashcards,
            localized,
            summary_failures: reduction.summary_failures,
        }
    }

    /// True if any provider call behind this result failed.
    pub fn is_degraded(&self) -> bool {
        !self.summary_failures.is_empty()
            || self.quizzes.iter().any(Generated::is_failed)
            || self.flashcards.iter().any(Generated::is_failed)
            || self.localized.values().any(Generated::is_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{segment, SizeBudget};
    use crate::generation::ScriptedProvider;
    use std::sync::Arc;

    #[test]
    fn test_failed_chunk_result_fills_every_field() {
        let result = ChunkResult::failed(3, "worker crashed");
        assert_eq!(result.index, 3);
        assert_eq!(result.summary.error(), Some("worker crashed"));
        assert_eq!(result.quiz.error(), Some("worker crashed"));
        assert_eq!(result.flashcards.error(), Some("worker crashed"));
    }

    #[test]
    fn test_aggregated_result_json_shape() {
        let result = AggregatedResult {
            summary: "S".into(),
            quizzes: vec![Generated::failed("timeout")],
            flashcards: vec![],
            localized: HashMap::from([("hi-IN".to_string(), Generated::Ok("H".to_string()))]),
            summary_failures: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"], "S");
        assert_eq!(json["quizzes"][0]["error"], "timeout");
        assert_eq!(json["localized"]["hi-IN"], "H");
        assert!(json.get("summary_failures").is_none());
        assert!(result.is_degraded());
    }

    #[tokio::test]
    async fn test_end_to_end_with_echo_provider() {
        let text: String = "alpha beta gamma delta. ".chars().cycle().take(9000).collect();
        let provider = Arc::new(ScriptedProvider::new());
        let budget = SizeBudget::Chars(4000);

        let segments = segment(&text, budget).unwrap();
        assert_eq!(segments.len(), 3);

        let fanout = FanOut::new(ChunkProcessor::new(provider.clone(), CallPolicy::default()), 3);
        let results = fanout.run(&segments).await;

        let reducer = Reducer::new(provider.clone(), CallPolicy::default(), budget);
        let reduction = reducer.reduce(&results).await.unwrap();

        // Three short summaries fit in a single reduction part
        assert_eq!(reduction.summary, "SUMMARY:SUMMARY:al");
        assert_eq!(reduction.quizzes.len(), 3);
        assert_eq!(reduction.flashcards.len(), 3);

        let localizer = Localizer::new(provider.clone(), CallPolicy::default(), vec!["hi-IN".into()]);
        let localized = localizer
            .localize_all(&reduction.summary, &["hi-IN".to_string(), "es-ES".to_string()])
            .await;
        let result = AggregatedResult::from_parts(reduction, localized);

        assert_eq!(result.localized["es-ES"], Generated::Ok("es-ES:SUMMARY:SUMMARY:al".into()));
        assert!(!result.is_degraded());
        // 3 segments x 3 calls, one reduction call, two locales
        assert_eq!(provider.calls(), 12);
    }
}
