use std::net::{IpAddr, Ipv6Addr};

/// The two components of a syntactically valid address, borrowed from the
/// input string. `domain` excludes the `@` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailParts<'a> {
    pub local: &'a str,
    pub domain: &'a str,
}

/// Parses an email address according to RFC 5322 and RFC 6531.
///
/// Performs syntax checking of both local-part and domain with:
/// - Full quoted-string local-part support
/// - Domain literal (IP address) validation
/// - Internationalized email (UTF-8) support
/// - Length constraint enforcement (254 total, 64 local)
///
/// Returns the split parts on success so callers get the domain without
/// re-scanning, or `None` when the address is malformed.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::parse;
///
/// let parts = parse("user.name+tag@example.com").unwrap();
/// assert_eq!(parts.domain, "example.com");
/// assert!(parse("invalid@ex_mple.com").is_none());
/// ```
pub fn parse(email: &str) -> Option<EmailParts<'_>> {
    // Overall length constraint (RFC 5321 + 5322)
    if email.len() > 254 {
        return None;
    }

    let split_index = unquoted_at_position(email)?;
    let local = &email[..split_index];
    let domain = &email[split_index + 1..];

    // Local part length constraint (RFC 5321)
    if local.len() > 64 || !local_part_ok(local) {
        return None;
    }

    if !domain_part_ok(domain) {
        return None;
    }

    Some(EmailParts { local, domain })
}

/// Convenience wrapper for callers that only need the verdict.
pub fn is_valid_email(email: &str) -> bool {
    parse(email).is_some()
}

/// Finds the separating `@`, skipping any `@` inside a quoted local part.
fn unquoted_at_position(email: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escape = false;

    for (i, c) in email.char_indices() {
        match c {
            '"' if !escape => in_quotes = !in_quotes,
            '\\' if in_quotes => escape = true,
            '@' if !in_quotes => return Some(i),
            _ => escape = false,
        }
    }
    None
}

/// Local part in either dot-atom or quoted-string form (RFC 5322 3.4.1).
fn local_part_ok(local: &str) -> bool {
    if local.starts_with('"') && local.ends_with('"') && local.len() >= 2 {
        quoted_string_ok(local)
    } else {
        dot_atom_ok(local, false)
    }
}

/// Domain as either a dotted name or a bracketed literal (RFC 5322 3.4.1).
fn domain_part_ok(domain: &str) -> bool {
    if let Some(literal) = domain.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        domain_literal_ok(literal)
    } else {
        domain_name_ok(domain)
    }
}

fn quoted_string_ok(quoted: &str) -> bool {
    let content = &quoted[1..quoted.len() - 1];
    let mut escape = false;

    for c in content.chars() {
        if escape {
            if !matches!(c, '\\' | '"') {
                return false;
            }
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == '"' {
            return false; // Unescaped quote
        }
    }
    !escape // No dangling escape
}

/// Dot-atom form (RFC 5322 3.4.1). `is_domain` tightens the character set
/// to label characters.
fn dot_atom_ok(s: &str, is_domain: bool) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.iter().any(|&p| p.is_empty()) {
        return false;
    }

    parts.iter().all(|part| {
        part.chars().all(|c| match c {
            '-' => !is_domain || (!part.starts_with('-') && !part.ends_with('-')),
            c if is_domain => c.is_alphanumeric() || c == '-',
            _ => c.is_alphanumeric() || "!#$%&'*+/=?^_`{|}~".contains(c),
        })
    })
}

fn domain_literal_ok(literal: &str) -> bool {
    literal.parse::<IpAddr>().is_ok()
        || literal
            .strip_prefix("IPv6:")
            .and_then(|ip| ip.parse::<Ipv6Addr>().ok())
            .is_some()
}

/// Internationalized domain names per RFC 5890 and RFC 6531.
fn domain_name_ok(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    !labels.is_empty()
        && labels.iter().all(|label| {
            label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && dot_atom_ok(label, true)
        })
}
