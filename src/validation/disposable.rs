use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Domains operated by throwaway-mail providers. Addresses on these domains
/// are rejected outright regardless of DNS state.
static DISPOSABLE_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "mailinator.com",
        "guerrillamail.com",
        "guerrillamail.net",
        "10minutemail.com",
        "10minutemail.net",
        "temp-mail.org",
        "tempmail.com",
        "tempmail.net",
        "throwawaymail.com",
        "yopmail.com",
        "yopmail.fr",
        "getnada.com",
        "trashmail.com",
        "trashmail.de",
        "sharklasers.com",
        "maildrop.cc",
        "dispostable.com",
        "fakeinbox.com",
        "mintemail.com",
        "mytemp.email",
        "spamgourmet.com",
        "mailnesia.com",
        "tempinbox.com",
        "emailondeck.com",
        "burnermail.io",
        "33mail.com",
        "mohmal.com",
        "tempail.com",
        "moakt.com",
        "mailcatch.com",
        "spam4.me",
        "grr.la",
    ])
});

/// Whether `domain` belongs to a disposable-mail provider. Matching is by
/// whole lowercased domain.
pub fn is_disposable_domain(domain: &str) -> bool {
    DISPOSABLE_DOMAINS.contains(domain.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_disposable_domains_match() {
        assert!(is_disposable_domain("mailinator.com"));
        assert!(is_disposable_domain("yopmail.com"));
        assert!(is_disposable_domain("10minutemail.com"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_disposable_domain("MAILINATOR.COM"));
        assert!(is_disposable_domain("Guerrillamail.Com"));
    }

    #[test]
    fn regular_domains_pass() {
        assert!(!is_disposable_domain("gmail.com"));
        assert!(!is_disposable_domain("example.com"));
    }

    #[test]
    fn subdomains_are_not_matched() {
        // Whole-domain matching only
        assert!(!is_disposable_domain("sub.mailinator.com"));
    }
}
