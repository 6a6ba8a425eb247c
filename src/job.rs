//! Job records.
//!
//! A job tracks one uploaded artifact through the pipeline:
//! `Pending -> Processing -> Done | Failed`. Terminal states never change.

use crate::error::{LectioError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// The record of one pipeline run.
///
/// Status and its outcome fields change only through [`Job::start`],
/// [`Job::complete`] and [`Job::fail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub filename: String,
    status: JobStatus,
    /// Where the serialized result was stored. Set only when `Done`.
    result_location: Option<String>,
    /// Failure reason. Set only when `Failed`.
    error: Option<String>,
    pub created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(filename: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), filename)
    }

    pub fn with_id(id: Uuid, filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename: filename.into(),
            status: JobStatus::Pending,
            result_location: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result_location(&self) -> Option<&str> {
        self.result_location.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pending -> Processing.
    pub fn start(&mut self) -> Result<()> {
        self.transition(JobStatus::Processing, &[JobStatus::Pending])
    }

    /// Processing -> Done, recording where the result lives.
    pub fn complete(&mut self, location: impl Into<String>) -> Result<()> {
        self.transition(JobStatus::Done, &[JobStatus::Processing])?;
        self.result_location = Some(location.into());
        Ok(())
    }

    /// Pending or Processing -> Failed, recording the reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(JobStatus::Failed, &[JobStatus::Pending, JobStatus::Processing])?;
        self.error = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, to: JobStatus, allowed_from: &[JobStatus]) -> Result<()> {
        if !allowed_from.contains(&self.status) {
            return Err(LectioError::InvalidTransition(format!(
                "job {} cannot go from {} to {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
