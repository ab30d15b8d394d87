//! Ingestion job tracking
//!
//! One record per bulk ingestion run, polled by callers for progress. The
//! record is written on creation and replaced once on the terminal
//! transition; it is never field-mutated concurrently.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Success,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }
}

/// Tracks one bulk ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    pub id: String,

    /// The integration this run ingests from
    pub source_id: String,

    pub environment_id: String,

    /// User who kicked off the run
    pub initiator_id: String,

    pub status: JobStatus,

    /// Number of APIs the agent reported as discoverable
    pub upper_limit: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Instant after which pollers may consider the job stale
    pub deadline: DateTime<Utc>,
}

impl IngestionJob {
    /// Create a pending job sized to the agent-reported count.
    pub fn pending(
        id: String,
        source_id: &str,
        environment_id: &str,
        initiator_id: &str,
        upper_limit: u64,
        now: DateTime<Utc>,
        deadline: std::time::Duration,
    ) -> Self {
        Self {
            id,
            source_id: source_id.to_string(),
            environment_id: environment_id.to_string(),
            initiator_id: initiator_id.to_string(),
            status: JobStatus::Pending,
            upper_limit,
            created_at: now,
            updated_at: now,
            deadline: now + Duration::from_std(deadline).unwrap_or_else(|_| Duration::minutes(5)),
        }
    }

    /// Terminal transition after all batches were applied.
    pub fn complete(&self, now: DateTime<Utc>) -> Self {
        self.transition(JobStatus::Success, now)
    }

    /// Terminal transition when the run could not start or finish.
    pub fn fail(&self, now: DateTime<Utc>) -> Self {
        self.transition(JobStatus::Error, now)
    }

    fn transition(&self, status: JobStatus, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.status = status;
        updated.updated_at = now;
        updated
    }
}
