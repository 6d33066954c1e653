use actix_web::{HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::VerifyError;
use crate::jobs::{BulkTarget, JobManager};
use crate::models::{JobResults, JobStatus, VerificationResult};
use crate::pipeline::{VerificationPolicy, Verifier};
use crate::resolver::DomainCache;

#[derive(Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkVerifyRequest {
    emails: Option<Vec<String>>,
    source: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BulkStartResponse {
    pub job_id: String,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub total: usize,
    pub processed: usize,
    pub progress_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<JobResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// # Single Email Verification Endpoint
///
/// Verifies one address under the enhanced policy: syntax and domain
/// classification, MX resolution, and an SMTP mailbox probe where the
/// provider allows it.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
///
/// ## Responses
/// - **200 OK**: Verification ran; the body is the full verification
///   result, including rejections (`valid: false` is a verdict, not an
///   error)
/// - **500 Internal Server Error**: Verification could not run
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Verification result", body = VerificationResult),
        (status = 500, description = "Verification failed to run")
    ),
    tag = "Email Verification"
)]
#[post("/verify-email")]
pub async fn verify_email(
    req: web::Json<VerifyEmailRequest>,
    verifier: web::Data<Verifier>,
) -> Result<impl Responder, actix_web::Error> {
    let mut cache = DomainCache::new();
    match verifier
        .verify(&req.email, VerificationPolicy::Enhanced, &mut cache)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({
            "error": "VERIFICATION_FAILED",
            "message": e.to_string()
        }))),
    }
}

/// # Bulk Contact Verification Endpoint
///
/// Starts a background verification job over stored contacts. The target
/// is either an explicit `emails` list or a `source` tag naming an
/// import; when both are present the explicit list wins. Only contacts
/// currently in `pending` state are verified.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `emails` array or `source` string
///
/// ## Responses
/// - **202 Accepted**: Job created; body carries `job_id` and `total`.
///   Progress is available from the job-status endpoint
/// - **400 Bad Request**: No target given, or no eligible contacts
/// - **500 Internal Server Error**: Job could not be created
///
/// ## Example Request
/// ```json
/// { "source": "crm-import-2025-06" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/verify-contacts",
    request_body = BulkVerifyRequest,
    responses(
        (status = 202, description = "Verification job started", body = BulkStartResponse),
        (status = 400, description = "No target or no eligible contacts"),
        (status = 500, description = "Job could not be created")
    ),
    tag = "Email Verification"
)]
#[post("/verify-contacts")]
pub async fn verify_contacts(
    req: web::Json<BulkVerifyRequest>,
    manager: web::Data<JobManager>,
) -> Result<impl Responder, actix_web::Error> {
    let BulkVerifyRequest { emails, source } = req.into_inner();
    let target = match (emails, source) {
        (Some(emails), _) if !emails.is_empty() => BulkTarget::Emails(emails),
        (_, Some(source)) if !source.trim().is_empty() => {
            BulkTarget::Source(source.trim().to_string())
        }
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "MISSING_TARGET",
                "message": "Provide a non-empty emails list or a source tag"
            })));
        }
    };

    match manager.start_bulk_verification(target).await {
        Ok(started) => Ok(HttpResponse::Accepted().json(BulkStartResponse {
            job_id: started.job_id,
            total: started.total,
            source: started.source,
        })),
        Err(VerifyError::NoEligibleContacts) => Ok(HttpResponse::BadRequest().json(json!({
            "error": "NO_ELIGIBLE_CONTACTS",
            "message": "No eligible contacts to verify"
        }))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(json!({
            "error": "JOB_START_FAILED",
            "message": e.to_string()
        }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/job-status/{job_id}",
    responses(
        (status = 200, description = "Job status retrieved", body = JobStatusResponse),
        (status = 404, description = "Unknown job id"),
        (status = 500, description = "Job store unavailable")
    ),
    tag = "Email Verification"
)]
#[get("/job-status/{job_id}")]
pub async fn job_status(
    path: web::Path<String>,
    manager: web::Data<JobManager>,
) -> Result<impl Responder, actix_web::Error> {
    let job_id = path.into_inner();

    match manager.job_status(&job_id).await {
        Ok(Some(job)) => Ok(HttpResponse::Ok().json(JobStatusResponse {
            job_id: job.id.clone(),
            status: job.status,
            total: job.total,
            processed: job.processed,
            progress_percentage: job.progress_percentage(),
            current_email: job.current_email,
            results: job.results,
            error: job.error,
        })),
        Ok(None) => Ok(HttpResponse::NotFound().json(json!({
            "error": "Job not found"
        }))),
        Err(_) => Ok(HttpResponse::InternalServerError().json(json!({
            "error": "Failed to retrieve job status"
        }))),
    }
}

/// Configures email verification routes under /api/v1
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(verify_email)
        .service(verify_contacts)
        .service(job_status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogReportSender;
    use crate::resolver::{MockMxLookup, MxEntry, MxResolver};
    use crate::smtp::{MockMailboxProbe, ProbeOutcome};
    use crate::store::{ContactStatus, InMemoryContactStore, InMemoryJobStore};
    use actix_web::{App, test};
    use std::sync::Arc;
    use std::time::Duration;

    /// Verifier over stubbed network seams: every domain has one MX
    /// except `dead.example`, and every probe reports the mailbox as
    /// present.
    fn stub_verifier() -> Arc<Verifier> {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().returning(|domain| {
            if domain == "dead.example" {
                Ok(Vec::new())
            } else {
                Ok(vec![MxEntry {
                    preference: 10,
                    exchange: format!("mx.{domain}"),
                }])
            }
        });
        let mut probe = MockMailboxProbe::new();
        probe
            .expect_probe()
            .returning(|_, _| Ok(ProbeOutcome::mailbox_exists("250 2.1.5 Ok".to_string())));
        Arc::new(Verifier::new(
            MxResolver::new(Arc::new(lookup)),
            Arc::new(probe),
        ))
    }

    async fn create_test_app(
        contacts: Arc<InMemoryContactStore>,
        jobs: Arc<InMemoryJobStore>,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        let verifier = stub_verifier();
        let manager = JobManager::new(
            contacts,
            jobs,
            Arc::new(LogReportSender),
            verifier.clone(),
        );

        test::init_service(
            App::new()
                .app_data(web::Data::from(verifier))
                .app_data(web::Data::new(manager))
                .configure(configure_routes),
        )
        .await
    }

    async fn poll_until_terminal(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        job_id: &str,
    ) -> serde_json::Value {
        for _ in 0..200 {
            let req = test::TestRequest::get()
                .uri(&format!("/job-status/{job_id}"))
                .to_request();
            let resp = test::call_service(app, req).await;
            assert_eq!(resp.status().as_u16(), 200);
            let body = test::read_body(resp).await;
            let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            if body_json["status"] == "completed" || body_json["status"] == "failed" {
                return body_json;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job never reached a terminal state");
    }

    #[actix_web::test]
    async fn test_verify_email_returns_full_result() {
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify-email")
            .set_json(json!({ "email": "user@ok.example" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["valid"], true);
        assert_eq!(body_json["status"], "valid");
        assert_eq!(body_json["confidence"], "high");
        assert_eq!(body_json["details"]["smtp_ok"], true);
        assert_eq!(body_json["mx_records"][0], "mx.ok.example");
    }

    #[actix_web::test]
    async fn test_verify_email_reports_rejections_as_results() {
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify-email")
            .set_json(json!({ "email": "not-an-email" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        // A failed check is still a 200: the verdict is the payload
        assert_eq!(resp.status().as_u16(), 200);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["valid"], false);
        assert_eq!(body_json["status"], "invalid");
        assert_eq!(body_json["reasons"][0], "Invalid email format");
    }

    #[actix_web::test]
    async fn test_verify_email_flags_domain_typos() {
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify-email")
            .set_json(json!({ "email": "user@gmial.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["status"], "typo");
        assert_eq!(body_json["reasons"][0], "Possible typo: gmail.com");
    }

    #[actix_web::test]
    async fn test_verify_contacts_accepts_then_completes_in_background() {
        let contacts = Arc::new(InMemoryContactStore::new());
        contacts
            .insert("user@ok.example", ContactStatus::Pending, None)
            .await;
        contacts
            .insert("x@dead.example", ContactStatus::Pending, None)
            .await;
        let jobs = Arc::new(InMemoryJobStore::new());
        let app = create_test_app(contacts.clone(), jobs).await;

        let req = test::TestRequest::post()
            .uri("/verify-contacts")
            .set_json(json!({ "emails": ["user@ok.example", "x@dead.example"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 202);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let job_id = body_json["job_id"].as_str().unwrap().to_string();
        assert_eq!(body_json["total"], 2);

        let status = poll_until_terminal(&app, &job_id).await;
        assert_eq!(status["status"], "completed");
        assert_eq!(status["processed"], 2);
        assert_eq!(status["progress_percentage"], 100);
        assert_eq!(status["results"]["valid"], 1);
        assert_eq!(status["results"]["invalid"], 1);

        assert_eq!(
            contacts.status_of("user@ok.example").await,
            Some(ContactStatus::Verified)
        );
        assert_eq!(
            contacts.status_of("x@dead.example").await,
            Some(ContactStatus::Invalid)
        );
    }

    #[actix_web::test]
    async fn test_verify_contacts_by_source_tag() {
        let contacts = Arc::new(InMemoryContactStore::new());
        contacts
            .insert("a@ok.example", ContactStatus::Pending, Some("import-1"))
            .await;
        contacts
            .insert("b@ok.example", ContactStatus::Pending, Some("other"))
            .await;
        let app = create_test_app(contacts, Arc::new(InMemoryJobStore::new())).await;

        let req = test::TestRequest::post()
            .uri("/verify-contacts")
            .set_json(json!({ "source": "import-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 202);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["total"], 1);
        assert_eq!(body_json["source"], "import-1");

        let job_id = body_json["job_id"].as_str().unwrap().to_string();
        let status = poll_until_terminal(&app, &job_id).await;
        assert_eq!(status["status"], "completed");
    }

    #[actix_web::test]
    async fn test_verify_contacts_without_target_is_rejected() {
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify-contacts")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["error"], "MISSING_TARGET");
    }

    #[actix_web::test]
    async fn test_verify_contacts_with_no_eligible_contacts_is_rejected() {
        // Store is empty, so nothing the request names is pending
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/verify-contacts")
            .set_json(json!({ "emails": ["ghost@ok.example"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["error"], "NO_ELIGIBLE_CONTACTS");
    }

    #[actix_web::test]
    async fn test_job_status_for_unknown_job_is_404() {
        let app = create_test_app(
            Arc::new(InMemoryContactStore::new()),
            Arc::new(InMemoryJobStore::new()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/job-status/no-such-job")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);

        let body = test::read_body(resp).await;
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["error"], "Job not found");
    }
}
