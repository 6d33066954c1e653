/// # Health Status Response
///
/// Service liveness payload returned by the health check endpoint.
pub mod health;

/// # Verification Job Records
///
/// Persisted state of bulk verification runs: lifecycle status, progress
/// counters and the aggregated result buckets.
pub mod job;

/// # Verification Results
///
/// The per-address verdict produced by the pipeline: status and confidence
/// enums, per-check details and the reason trail.
pub mod verification;

pub use health::HealthResponse;
pub use job::{JobResults, JobStatus, VerificationJob};
pub use verification::{CheckDetails, Confidence, VerificationResult, VerificationStatus};
