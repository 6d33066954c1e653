use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Common misspellings of major mail providers, mapped to the intended
/// domain. Matching is by whole lowercased domain, never fuzzy.
static TYPO_DOMAINS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("gmial.com", "gmail.com"),
        ("gmal.com", "gmail.com"),
        ("gamil.com", "gmail.com"),
        ("gnail.com", "gmail.com"),
        ("gmaill.com", "gmail.com"),
        ("gmai.com", "gmail.com"),
        ("gmail.co", "gmail.com"),
        ("gmail.cm", "gmail.com"),
        ("gmail.con", "gmail.com"),
        ("googlemail.co", "googlemail.com"),
        ("hotmal.com", "hotmail.com"),
        ("hotmial.com", "hotmail.com"),
        ("hotmil.com", "hotmail.com"),
        ("hotamil.com", "hotmail.com"),
        ("hotmail.co", "hotmail.com"),
        ("hotmail.con", "hotmail.com"),
        ("outlok.com", "outlook.com"),
        ("outloo.com", "outlook.com"),
        ("outlook.co", "outlook.com"),
        ("outllook.com", "outlook.com"),
        ("yaho.com", "yahoo.com"),
        ("yahooo.com", "yahoo.com"),
        ("yhoo.com", "yahoo.com"),
        ("yahoo.co", "yahoo.com"),
        ("yahou.com", "yahoo.com"),
        ("icloud.co", "icloud.com"),
        ("iclod.com", "icloud.com"),
        ("icould.com", "icloud.com"),
        ("protonmai.com", "protonmail.com"),
        ("protonmial.com", "protonmail.com"),
        ("aoll.com", "aol.com"),
        ("aol.co", "aol.com"),
    ])
});

/// Returns the intended domain when `domain` is a known misspelling.
/// Lookup is case-insensitive.
pub fn suggest_correction(domain: &str) -> Option<&'static str> {
    TYPO_DOMAINS.get(domain.to_lowercase().as_str()).copied()
}
