use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::batch::{BatchCoordinator, BatchObserver, BatchOutcome, BatchProgress};
use crate::error::{Result, VerifyError};
use crate::models::{JobResults, JobStatus, VerificationJob, VerificationResult};
use crate::notify::{CompletionReport, ReportSender};
use crate::pipeline::{VerificationPolicy, Verifier};
use crate::resolver::DomainCache;
use crate::store::{ContactStatus, ContactStore, JobStore};
use crate::validation::role_based;

/// What a bulk request verifies: an explicit address list or every
/// pending contact carrying a source tag.
#[derive(Debug, Clone)]
pub enum BulkTarget {
    Emails(Vec<String>),
    Source(String),
}

/// Immediate answer to a bulk start. The job already exists in the job
/// store and keeps running in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkStarted {
    pub job_id: String,
    pub total: usize,
    pub source: Option<String>,
}

/// Trims, lowercases and de-duplicates addresses, keeping first-seen
/// order.
fn normalize(emails: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for email in emails {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            continue;
        }
        if seen.insert(email.clone()) {
            normalized.push(email);
        }
    }
    normalized
}

/// # Job Manager
///
/// Orchestrates bulk verification runs: resolves the target set, creates
/// the job record, hands the batch to a background task, and owns the
/// job's lifecycle through to its terminal state and the one completion
/// report that follows it.
#[derive(Clone)]
pub struct JobManager {
    contacts: Arc<dyn ContactStore>,
    jobs: Arc<dyn JobStore>,
    reports: Arc<dyn ReportSender>,
    verifier: Arc<Verifier>,
}

impl JobManager {
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        jobs: Arc<dyn JobStore>,
        reports: Arc<dyn ReportSender>,
        verifier: Arc<Verifier>,
    ) -> Self {
        Self {
            contacts,
            jobs,
            reports,
            verifier,
        }
    }

    /// Starts a bulk verification run. Returns as soon as the job record
    /// exists; verification continues in a spawned task. Fails without
    /// creating a job when the target resolves to zero eligible
    /// contacts.
    pub async fn start_bulk_verification(&self, target: BulkTarget) -> Result<BulkStarted> {
        let (candidates, source) = match target {
            BulkTarget::Emails(emails) => (normalize(emails), None),
            BulkTarget::Source(source) => {
                let found = self.contacts.find_pending_by_source(&source).await?;
                (normalize(found), Some(source))
            }
        };

        // Source queries are pending-only already; explicit lists may
        // name contacts in any state
        let eligible = match source {
            Some(_) => candidates,
            None => self.contacts.filter_pending(&candidates).await?,
        };

        if eligible.is_empty() {
            return Err(VerifyError::NoEligibleContacts);
        }

        let job = VerificationJob::new(eligible.len(), source.clone());
        self.jobs.create(&job).await?;

        info!(
            target: "verify_job",
            job_id = %job.id,
            total = job.total,
            source = source.as_deref().unwrap_or("-"),
            "bulk verification started"
        );

        let started = BulkStarted {
            job_id: job.id.clone(),
            total: job.total,
            source,
        };

        let manager = self.clone();
        tokio::spawn(async move { manager.run_job(job, eligible).await });

        Ok(started)
    }

    /// Fetches the stored record for one job.
    pub async fn job_status(&self, job_id: &str) -> Result<Option<VerificationJob>> {
        self.jobs.fetch(job_id).await
    }

    async fn run_job(&self, mut job: VerificationJob, emails: Vec<String>) {
        match self.execute(&mut job, &emails).await {
            Ok(outcome) => {
                let generic = outcome
                    .valid
                    .iter()
                    .filter(|email| role_based::is_generic_address(email))
                    .count();
                let results = JobResults {
                    valid: outcome.valid.len() - generic,
                    valid_generic: generic,
                    invalid: outcome.invalid.len(),
                    needs_verification: outcome.needs_verification.len(),
                };

                job.processed = job.total;
                job.current_email = None;
                job.status = JobStatus::Completed;
                job.results = Some(results);
                job.completed_at = Some(Utc::now().timestamp());
                if let Err(err) = self.jobs.update(&job).await {
                    error!(
                        target: "verify_job",
                        job_id = %job.id,
                        error = %err,
                        "failed to persist completed job"
                    );
                }

                self.send_report(&job, results, None).await;
            }
            Err(err) => {
                let message = err.to_string();
                error!(
                    target: "verify_job",
                    job_id = %job.id,
                    error = %message,
                    "verification job failed"
                );

                job.status = JobStatus::Failed;
                job.error = Some(message.clone());
                job.current_email = None;
                job.completed_at = Some(Utc::now().timestamp());
                if let Err(persist_err) = self.jobs.update(&job).await {
                    error!(
                        target: "verify_job",
                        job_id = %job.id,
                        error = %persist_err,
                        "failed to persist failed job"
                    );
                }

                self.send_report(&job, JobResults::default(), Some(message))
                    .await;
            }
        }
    }

    async fn execute(
        &self,
        job: &mut VerificationJob,
        emails: &[String],
    ) -> Result<BatchOutcome> {
        self.contacts.mark_verifying(emails).await?;

        job.status = JobStatus::Processing;
        job.started_at = Some(Utc::now().timestamp());
        if let Err(err) = self.jobs.update(job).await {
            warn!(
                target: "verify_job",
                job_id = %job.id,
                error = %err,
                "failed to persist processing transition"
            );
        }

        let mut observer = JobProgress {
            contacts: Arc::clone(&self.contacts),
            jobs: Arc::clone(&self.jobs),
            job: job.clone(),
        };
        let coordinator =
            BatchCoordinator::new(Arc::clone(&self.verifier), VerificationPolicy::MxOnly);
        let mut cache = DomainCache::new();
        let outcome = coordinator.run(emails, &mut observer, &mut cache).await;

        *job = observer.job;
        Ok(outcome)
    }

    async fn send_report(&self, job: &VerificationJob, results: JobResults, error: Option<String>) {
        let report = CompletionReport {
            job_id: job.id.clone(),
            source: job.source.clone(),
            total: job.total,
            valid: results.valid,
            valid_generic: results.valid_generic,
            invalid: results.invalid,
            error,
        };
        if let Err(err) = self.reports.send_report(&report).await {
            let err = VerifyError::Notification(err.to_string());
            warn!(
                target: "verify_job",
                job_id = %job.id,
                error = %err,
                "completion report not delivered"
            );
        }
    }
}

/// Batch observer that persists per-contact statuses and per-address job
/// progress. Both writes are best-effort; a failed write is logged and
/// the batch keeps going.
struct JobProgress {
    contacts: Arc<dyn ContactStore>,
    jobs: Arc<dyn JobStore>,
    job: VerificationJob,
}

#[async_trait]
impl BatchObserver for JobProgress {
    async fn on_result(&mut self, result: &VerificationResult) {
        let status = if !result.valid {
            ContactStatus::Invalid
        } else if role_based::is_generic_address(&result.email) {
            ContactStatus::VerifiedGeneric
        } else {
            ContactStatus::Verified
        };
        if let Err(err) = self.contacts.set_status(&result.email, status).await {
            warn!(
                target: "verify_job",
                job_id = %self.job.id,
                email = %result.email,
                error = %err,
                "failed to persist contact status"
            );
        }
    }

    async fn on_progress(&mut self, progress: &BatchProgress) {
        self.job.processed = progress.completed;
        self.job.current_email = Some(progress.current.clone());
        if let Err(err) = self.jobs.update(&self.job).await {
            warn!(
                target: "verify_job",
                job_id = %self.job.id,
                error = %err,
                "failed to persist job progress"
            );
        }
    }
}
