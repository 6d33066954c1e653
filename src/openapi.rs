use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Defines the API contract using OpenAPI 3.0 format with utoipa procedural macros.
/// This documentation serves as the source of truth for both API consumers and
/// automated documentation generators.
///
/// # Endpoints
/// - Health Check: `GET /health`
/// - Single Verification: `POST /verify-email`
/// - Bulk Verification: `POST /verify-contacts`
/// - Job Status: `GET /job-status/{job_id}`
///
/// # Schemas
/// - `HealthResponse`: Service status payload
/// - `VerificationResult`: Full verdict for one address
/// - `JobStatusResponse`: Progress document for a bulk job
///
/// # Note
/// The OpenAPI spec is generated at compile time from these annotations. Any changes
/// to the API surface should be reflected here first to maintain documentation accuracy.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::verify::verify_email,
        crate::routes::verify::verify_contacts,
        crate::routes::verify::job_status,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::verification::VerificationResult,
            crate::models::verification::VerificationStatus,
            crate::models::verification::Confidence,
            crate::models::verification::CheckDetails,
            crate::models::job::JobStatus,
            crate::models::job::JobResults,
            crate::routes::verify::VerifyEmailRequest,
            crate::routes::verify::BulkVerifyRequest,
            crate::routes::verify::BulkStartResponse,
            crate::routes::verify::JobStatusResponse,
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Verification", description = "Email verification and bulk job endpoints")
    ),
    info(
        description = "API for verifying email addresses: syntax and domain classification, MX resolution, SMTP mailbox probing, and background bulk verification jobs",
        title = "Email Verifier API",
        version = "0.7.0+sprint-4",
    )
)]
pub struct ApiDoc;
