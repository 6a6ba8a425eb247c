//! Concurrent processing of all segments of a transcript.

use super::policy::panic_message;
use super::{ChunkProcessor, ChunkResult};
use crate::chunking::Segment;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use indicatif::ProgressBar;
use std::panic::AssertUnwindSafe;
use tracing::{info, instrument, warn};

/// Runs a [`ChunkProcessor`] over every segment with bounded concurrency.
pub struct FanOut {
    processor: ChunkProcessor,
    max_concurrent: usize,
    progress: Option<ProgressBar>,
}

impl FanOut {
    pub fn new(processor: ChunkProcessor, max_concurrent: usize) -> Self {
        Self {
            processor,
            max_concurrent: max_concurrent.max(1),
            progress: None,
        }
    }

    /// Tick `progress` once per finished segment.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process all segments and return one result per segment, in input order.
    ///
    /// A panic that escapes a segment's processing is caught at that segment
    /// and turned into a result whose three fields all carry the failure.
    #[instrument(skip_all, fields(segments = segments.len()))]
    pub async fn run(&self, segments: &[Segment]) -> Vec<ChunkResult> {
        info!(
            "Processing {} segments (up to {} at a time)",
            segments.len(),
            self.max_concurrent
        );

        let mut results: Vec<(usize, ChunkResult)> = stream::iter(segments.iter().cloned().enumerate())
            .map(|(position, segment)| async move {
                let result = match AssertUnwindSafe(self.processor.process(&segment))
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        warn!("Segment {} aborted: {}", segment.index, reason);
                        ChunkResult::failed(segment.index, format!("segment processing aborted: {}", reason))
                    }
                };
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                (position, result)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        // Completion order is arbitrary; restore input order
        results.sort_by_key(|(position, _)| *position);

        results.into_iter().map(|(_, result)| result).collect()
    }
}
