//! Lectio - lecture study material generation
//!
//! Turns an uploaded lecture artifact (video, audio, slide deck, PDF or plain
//! text) into a summary, quiz questions, flashcards and localized summaries.
//!
//! # Overview
//!
//! The core is a chunk-and-reduce pipeline:
//! - the transcript is split into bounded-size segments
//! - every segment is summarized and turned into quiz items and flashcards,
//!   several segments at a time
//! - the per-segment summaries are segmented and summarized once more
//! - the final summary is translated into each requested locale
//!
//! A failed or timed-out provider call never aborts a job; its output is
//! replaced by an explicit failure entry.
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `chunking` - Text segmentation
//! - `generation` - Content provider abstraction and backends
//! - `pipeline` - Chunk processing, fan-out, reduction and localization
//! - `collaborators` - Transcription, text extraction, audio extraction, storage
//! - `job` - Job state machine
//! - `orchestrator` - Pipeline driver
//!
//! # Example
//!
//! ```rust,no_run
//! use lectio::config::Settings;
//! use lectio::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let locales = vec!["hi-IN".to_string()];
//!     let outcome = orchestrator.process_file(Path::new("week1.pdf"), &locales).await;
//!     println!("{}: {:?}", outcome.job.status(), outcome.job.result_location());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod generation;
pub mod job;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;

pub use error::{LectioError, Result};
