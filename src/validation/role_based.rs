use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Local-part prefixes that address a function rather than a person.
/// A hit is advisory: it lowers the classification to `role_based` but
/// never rejects the address on its own.
static ROLE_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "info",
        "contact",
        "hello",
        "help",
        "support",
        "admin",
        "administrator",
        "office",
        "sales",
        "press",
        "media",
        "marketing",
        "jobs",
        "careers",
        "hiring",
        "hr",
        "privacy",
        "security",
        "legal",
        "team",
        "feedback",
        "enquiries",
        "inquiries",
        "mail",
        "email",
        "webmaster",
        "postmaster",
        "hostmaster",
        "abuse",
        "newsletter",
        "noreply",
        "no-reply",
        "billing",
        "accounts",
        "finance",
        "service",
    ])
});

/// The subset of role prefixes treated as shared company inboxes. Valid
/// addresses on these are counted separately from personal ones.
static GENERIC_INBOXES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["info", "contact", "hello", "support", "sales"]));

/// Whether this local part matches `prefix`: exact, or the prefix followed
/// by `.`, `_` or `-` (so `admin.team` matches `admin`, `administrator`
/// does not match a bare `admin` entry unless listed itself).
fn matches_prefix(local: &str, prefix: &str) -> bool {
    local == prefix
        || local
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(['.', '_', '-']))
}

/// Returns the matched role prefix for this local part, if any.
pub fn role_prefix(local: &str) -> Option<&'static str> {
    let local = local.to_lowercase();
    ROLE_PREFIXES
        .iter()
        .find(|prefix| matches_prefix(&local, prefix))
        .copied()
}

pub fn is_role_local(local: &str) -> bool {
    role_prefix(local).is_some()
}

/// Whether this local part is one of the generic shared inboxes.
pub fn is_generic_inbox(local: &str) -> bool {
    let local = local.to_lowercase();
    GENERIC_INBOXES
        .iter()
        .any(|prefix| matches_prefix(&local, prefix))
}

/// Convenience for full addresses; generic classification happens after
/// verification, where only the address string is at hand.
pub fn is_generic_address(email: &str) -> bool {
    email
        .split('@')
        .next()
        .is_some_and(|local| is_generic_inbox(local))
}
