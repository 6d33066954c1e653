use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle states of a bulk verification job. `Completed` and `Failed`
/// are terminal; a job never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Aggregated counters attached to a job once it completes.
///
/// `needs_verification` is reserved for future catch-all handling and is
/// always zero today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JobResults {
    pub valid: usize,
    pub valid_generic: usize,
    pub invalid: usize,
    pub needs_verification: usize,
}

/// # Verification Job
///
/// The persisted record of one bulk verification run. Created in `pending`
/// state before the background task starts, updated in place as addresses
/// are processed, and frozen once it reaches a terminal state.
///
/// `processed` equals `total` exactly when the job completes. `results` is
/// populated on completion only; `error` on failure only. Timestamps are
/// unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationJob {
    pub id: String,
    pub total: usize,
    pub processed: usize,
    pub status: JobStatus,
    pub current_email: Option<String>,
    pub results: Option<JobResults>,
    pub error: Option<String>,
    pub source: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl VerificationJob {
    pub fn new(total: usize, source: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            total,
            processed: 0,
            status: JobStatus::Pending,
            current_email: None,
            results: None,
            error: None,
            source,
            created_at: Utc::now().timestamp(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Completion percentage rounded to the nearest integer and clamped to
    /// `[0, 100]`.
    pub fn progress_percentage(&self) -> u8 {
        if self.total == 0 {
            return if self.status == JobStatus::Completed {
                100
            } else {
                0
            };
        }
        let pct = (self.processed as f64 / self.total as f64) * 100.0;
        pct.round().clamp(0.0, 100.0) as u8
    }
}
