/// Classifies an address through the fixed check sequence: syntax, typo
/// map, disposable denylist, role-prefix test. The first failing check
/// decides the outcome; the role test only annotates survivors.
pub mod classifier;

/// Static denylist of disposable-mail provider domains.
pub mod disposable;

/// Role-account local-part prefixes and the narrower generic-inbox subset
/// used to split `valid` from `valid_generic` in job results.
pub mod role_based;

/// Parses an email address according to RFC 5322 and RFC 6531, yielding
/// the local part and domain on success.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax;
///
/// assert!(syntax::is_valid_email("user.name+tag@example.com"));
/// assert!(syntax::is_valid_email("Pelé@exämple.中国"));
/// assert!(!syntax::is_valid_email("invalid@ex_mple.com"));
/// ```
pub mod syntax;

/// Static map of common provider-domain misspellings.
pub mod typo;

pub use classifier::{Classified, classify};
