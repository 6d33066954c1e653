use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};

use crate::models::VerificationResult;
use crate::pipeline::{VerificationPolicy, Verifier};
use crate::resolver::DomainCache;

/// Addresses bucketed by the verdict of one batch run. The
/// `needs_verification` bucket is reserved; no current verdict lands
/// there.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
    pub needs_verification: Vec<String>,
}

/// Progress snapshot emitted after each processed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current: String,
}

/// Callbacks invoked per processed address, `on_result` first and
/// `on_progress` second. Callers persist per-contact statuses from
/// `on_result` and job progress from `on_progress`.
#[automock]
#[async_trait]
pub trait BatchObserver: Send {
    async fn on_result(&mut self, result: &VerificationResult);
    async fn on_progress(&mut self, progress: &BatchProgress);
}

/// # Batch Coordinator
///
/// Runs verification over a list of addresses strictly sequentially,
/// sharing one domain cache across the whole batch. Sequential
/// processing keeps the cache single-writer and avoids hammering any
/// target mail server.
pub struct BatchCoordinator {
    verifier: Arc<Verifier>,
    policy: VerificationPolicy,
}

impl BatchCoordinator {
    pub fn new(verifier: Arc<Verifier>, policy: VerificationPolicy) -> Self {
        Self { verifier, policy }
    }

    /// Verifies every address in order. An address whose verification
    /// errors is recorded as invalid with the error message as reason
    /// and the batch continues.
    pub async fn run(
        &self,
        emails: &[String],
        observer: &mut dyn BatchObserver,
        cache: &mut DomainCache,
    ) -> BatchOutcome {
        let total = emails.len();
        let mut outcome = BatchOutcome::default();

        debug!(target: "verify_batch", total, "starting batch");

        for (index, email) in emails.iter().enumerate() {
            let result = match self.verifier.verify(email, self.policy, cache).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        target: "verify_batch",
                        email = %email,
                        error = %err,
                        "verification raised an error; recording address as invalid"
                    );
                    VerificationResult::from_failure(email, err.to_string())
                }
            };

            if result.valid {
                outcome.valid.push(result.email.clone());
            } else {
                outcome.invalid.push(result.email.clone());
            }

            observer.on_result(&result).await;
            observer
                .on_progress(&BatchProgress {
                    completed: index + 1,
                    total,
                    current: result.email,
                })
                .await;
        }

        debug!(
            target: "verify_batch",
            valid = outcome.valid.len(),
            invalid = outcome.invalid.len(),
            "batch finished"
        );
        outcome
    }
}
