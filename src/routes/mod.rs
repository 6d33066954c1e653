use actix_web::web;

/// # Health Check Endpoint
///
/// Returns the current health status of the service along with a timestamp.
///
/// ## Response
///
/// - **200 OK**: Service is healthy
///   - Body: JSON object with `status` ("UP") and `timestamp` in ISO 8601 format
pub mod health;

/// # Email Verification Endpoints
///
/// Single-address verification, bulk contact verification jobs, and job
/// status queries.
///
/// ## Endpoints
/// - `POST /verify-email`: verify one address with the SMTP-backed policy
/// - `POST /verify-contacts`: start a background job over stored contacts
/// - `GET /job-status/{job_id}`: observe a job's progress and results
pub mod verify;

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// ## Mounted Services
/// - Health check endpoints (see [`health::configure_routes`] for details)
/// - Email verification endpoints (see [`verify::configure_routes`] for details)
///
/// ## Example Endpoints
///
/// ```text
/// GET  /api/v1/health - Service health status
/// POST /api/v1/verify-email - Single email verification
/// POST /api/v1/verify-contacts - Bulk contact verification job
/// GET  /api/v1/job-status/{job_id} - Verification job status
/// ```
///
/// [`health::configure_routes`]: crate::routes::health::configure_routes
/// [`verify::configure_routes`]: crate::routes::verify::configure_routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(verify::configure_routes),
    );
}
