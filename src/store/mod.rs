/// In-memory contact and job stores for tests and for running without
/// external services.
pub mod memory;

/// MongoDB-backed contact store.
pub mod mongo;

/// Redis-backed job store.
pub mod redis_jobs;

pub use memory::{InMemoryContactStore, InMemoryJobStore};
pub use mongo::MongoContactStore;
pub use redis_jobs::RedisJobStore;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::VerificationJob;

/// Externally visible verification state of a stored contact. Only
/// `pending` contacts are eligible for a new bulk run; a finished run
/// leaves each processed contact `verified`, `verified_generic` or
/// `invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Pending,
    Verifying,
    Verified,
    VerifiedGeneric,
    Invalid,
}

impl ContactStatus {
    /// Wire spelling used in stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Verifying => "verifying",
            ContactStatus::Verified => "verified",
            ContactStatus::VerifiedGeneric => "verified_generic",
            ContactStatus::Invalid => "invalid",
        }
    }
}

/// Contact persistence seam used by the job manager.
#[automock]
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Returns the subset of `emails` currently stored as `pending`,
    /// in the order given.
    async fn filter_pending(&self, emails: &[String]) -> Result<Vec<String>>;

    /// Returns every `pending` contact carrying the given source tag.
    async fn find_pending_by_source(&self, source: &str) -> Result<Vec<String>>;

    /// Moves the given contacts to `verifying` ahead of a batch run.
    async fn mark_verifying(&self, emails: &[String]) -> Result<()>;

    /// Records the final status of one contact.
    async fn set_status(&self, email: &str, status: ContactStatus) -> Result<()>;
}

/// Job record persistence seam.
#[automock]
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &VerificationJob) -> Result<()>;

    async fn fetch(&self, job_id: &str) -> Result<Option<VerificationJob>>;

    async fn update(&self, job: &VerificationJob) -> Result<()>;
}
