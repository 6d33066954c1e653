use super::{disposable, role_based, syntax, typo};

/// Outcome of the local (network-free) classification stage.
///
/// Checks run in a fixed order and the first failing check decides the
/// variant; later checks never execute. The role test is advisory and only
/// annotates `Candidate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Syntax check failed or no domain could be extracted.
    Malformed,
    /// Domain is a known misspelling of `suggestion`.
    Typo {
        domain: String,
        suggestion: &'static str,
    },
    /// Domain belongs to a disposable-mail provider.
    Disposable { domain: String },
    /// Passed all local rejections; eligible for DNS and SMTP checks.
    /// `domain` is lowercased. `generic` implies `role_based`.
    Candidate {
        domain: String,
        role_based: bool,
        generic: bool,
    },
}

/// Classifies one trimmed address string without touching the network.
pub fn classify(email: &str) -> Classified {
    let Some(parts) = syntax::parse(email) else {
        return Classified::Malformed;
    };

    let domain = parts.domain.to_lowercase();

    if let Some(suggestion) = typo::suggest_correction(&domain) {
        return Classified::Typo { domain, suggestion };
    }

    if disposable::is_disposable_domain(&domain) {
        return Classified::Disposable { domain };
    }

    let role_based = role_based::is_role_local(parts.local);
    let generic = role_based && role_based::is_generic_inbox(parts.local);

    Classified::Candidate {
        domain,
        role_based,
        generic,
    }
}
