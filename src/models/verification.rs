use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Verification Status
///
/// Final classification of a verified address. Exactly one status is
/// assigned per verification and it never changes afterwards.
///
/// ## Variants
/// - `Valid`: deliverable as far as the executed checks can tell
/// - `Invalid`: syntax, domain or mailbox check failed hard
/// - `Disposable`: domain belongs to a throwaway-mail provider
/// - `RoleBased`: local part addresses a function rather than a person
/// - `Typo`: domain is a known misspelling of a major provider
/// - `CatchAll`: reserved; catch-all detection is not performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Valid,
    Invalid,
    Disposable,
    RoleBased,
    Typo,
    CatchAll,
}

/// Confidence attached to a verdict. `High` needs either a local decision
/// (syntax, denylist) or a conclusive SMTP answer; anything inferred from
/// MX presence alone is `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Outcome of each individual check that ran for an address.
///
/// `smtp_ok` is `None` when no probe ran or the probe was indeterminate,
/// `Some(true)`/`Some(false)` only on a conclusive RCPT answer. `catch_all`
/// is reserved and stays `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckDetails {
    pub syntax_ok: bool,
    pub mx_ok: bool,
    pub smtp_ok: Option<bool>,
    pub disposable: bool,
    pub role_based: bool,
    pub typo: bool,
    pub catch_all: Option<bool>,
}

impl Default for CheckDetails {
    fn default() -> Self {
        Self {
            syntax_ok: false,
            mx_ok: false,
            smtp_ok: None,
            disposable: false,
            role_based: false,
            typo: false,
            catch_all: None,
        }
    }
}

/// # Verification Result
///
/// The immutable record produced for one address by the verification
/// pipeline.
///
/// ## Fields
/// - `email`: the address as verified (trimmed input)
/// - `valid`: overall deliverability verdict
/// - `status`: classification, see [`VerificationStatus`]
/// - `confidence`: strength of the verdict
/// - `reasons`: ordered human-readable strings explaining the verdict
/// - `details`: per-check outcomes, see [`CheckDetails`]
/// - `mx_records`: resolved MX hostnames in preference order, empty when
///   resolution failed or was never reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationResult {
    pub email: String,
    pub valid: bool,
    pub status: VerificationStatus,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub details: CheckDetails,
    pub mx_records: Vec<String>,
}

impl VerificationResult {
    /// A rejection decided before any network activity.
    pub fn rejected(
        email: &str,
        status: VerificationStatus,
        confidence: Confidence,
        reason: String,
        details: CheckDetails,
    ) -> Self {
        Self {
            email: email.to_string(),
            valid: false,
            status,
            confidence,
            reasons: vec![reason],
            details,
            mx_records: Vec::new(),
        }
    }

    /// Result for an address whose verification raised an internal error.
    /// The failure keeps the address out of the valid bucket without
    /// aborting the rest of a batch.
    pub fn from_failure(email: &str, message: String) -> Self {
        Self {
            email: email.to_string(),
            valid: false,
            status: VerificationStatus::Invalid,
            confidence: Confidence::Low,
            reasons: vec![message],
            details: CheckDetails::default(),
            mx_records: Vec::new(),
        }
    }
}
