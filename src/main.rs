use std::sync::Arc;

use actix_web::{App, HttpServer, web::Data};
use email_verifier::config::AppConfig;
use email_verifier::jobs::JobManager;
use email_verifier::notify::LogReportSender;
use email_verifier::openapi::ApiDoc;
use email_verifier::pipeline::Verifier;
use email_verifier::resolver::{DnsMxLookup, MxResolver};
use email_verifier::smtp::{ProbeSettings, SmtpProbe};
use email_verifier::store::{
    ContactStore, InMemoryContactStore, InMemoryJobStore, JobStore, MongoContactStore,
    RedisJobStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Verifier Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - REST endpoints for single and bulk email verification
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
/// - MongoDB-backed contacts and Redis-backed jobs, with in-memory
///   fallbacks when the corresponding URLs are not configured
///
/// # Endpoints
/// - Health: `/api/v1/health`
/// - Verify one address: `/api/v1/verify-email`
/// - Start a bulk job: `/api/v1/verify-contacts`
/// - Poll a job: `/api/v1/job-status/{job_id}`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
///
/// # Configuration
/// - Server binds to `HOST:PORT` (`127.0.0.1:8080` by default)
/// - `MONGODB_URI` and `REDIS_URL` select the persistent stores
/// - Environment variables loaded from `.env` file (if present)
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let resolver = MxResolver::new(Arc::new(DnsMxLookup::new(
        config.dns_timeout,
        config.dns_attempts,
    )));
    let probe = SmtpProbe::new(ProbeSettings {
        timeout: config.smtp_timeout,
        port: config.smtp_port,
        helo_domain: config.helo_domain.clone(),
    });
    let verifier = Arc::new(Verifier::new(resolver, Arc::new(probe)));

    let contacts: Arc<dyn ContactStore> = match &config.mongodb_uri {
        Some(uri) => {
            let store = MongoContactStore::connect(
                uri,
                &config.mongodb_database,
                &config.contacts_collection,
            )
            .await
            .map_err(std::io::Error::other)?;
            info!(
                database = %config.mongodb_database,
                collection = %config.contacts_collection,
                "using MongoDB contact store"
            );
            Arc::new(store)
        }
        None => {
            warn!("MONGODB_URI not set, contacts are kept in memory");
            Arc::new(InMemoryContactStore::new())
        }
    };

    let jobs: Arc<dyn JobStore> = match &config.redis_url {
        Some(url) => {
            let store =
                RedisJobStore::new(url, config.job_ttl_seconds).map_err(std::io::Error::other)?;
            info!(ttl_seconds = config.job_ttl_seconds, "using Redis job store");
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set, jobs are kept in memory");
            Arc::new(InMemoryJobStore::new())
        }
    };

    let manager = JobManager::new(contacts, jobs, Arc::new(LogReportSender), verifier.clone());

    info!(host = %config.host, port = config.port, "starting email verifier");

    let bind_address = (config.host.clone(), config.port);
    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(Data::from(verifier.clone()))
            .app_data(Data::new(manager.clone()))
            .configure(email_verifier::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind(bind_address)?
    .run()
    .await
}
