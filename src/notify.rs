use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::error::Result;

/// Summary of a finished bulk verification run. One report is produced
/// per job, whether it completed or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub job_id: String,
    pub source: Option<String>,
    pub total: usize,
    pub valid: usize,
    pub valid_generic: usize,
    pub invalid: usize,
    pub error: Option<String>,
}

impl CompletionReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outbound notification seam. Failures are the caller's to log; they
/// never change the outcome of the job being reported on.
#[automock]
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send_report(&self, report: &CompletionReport) -> Result<()>;
}

/// Report sender that writes the summary to the log, standing in for
/// whichever outbound channel carries run summaries in a deployment.
pub struct LogReportSender;

#[async_trait]
impl ReportSender for LogReportSender {
    async fn send_report(&self, report: &CompletionReport) -> Result<()> {
        match &report.error {
            Some(error) => info!(
                target: "verify_job",
                job_id = %report.job_id,
                processed = report.total,
                error = %error,
                "verification job failed"
            ),
            None => info!(
                target: "verify_job",
                job_id = %report.job_id,
                total = report.total,
                valid = report.valid,
                valid_generic = report.valid_generic,
                invalid = report.invalid,
                "verification job completed"
            ),
        }
        Ok(())
    }
}
