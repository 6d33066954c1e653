//! Error types shared across the verification service.

use std::io;
use thiserror::Error;

/// The primary error type for verification and job management.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error during DNS resolution of a recipient domain.
    #[error("DNS Resolution Error: {0}")]
    Dns(#[from] trust_dns_resolver::error::ResolveError),

    /// Socket-level error while talking to a mail server.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or updating contact records.
    #[error("Contact Store Error: {0}")]
    ContactStore(#[from] mongodb::error::Error),

    /// Error reading or persisting job records.
    #[error("Job Store Error: {0}")]
    JobStore(#[from] redis::RedisError),

    /// Error serializing or deserializing a stored document.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bulk request resolved to an empty set of eligible addresses.
    #[error("No eligible contacts to verify")]
    NoEligibleContacts,

    /// Failure delivering a completion report.
    #[error("Notification Error: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
