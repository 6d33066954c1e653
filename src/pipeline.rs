use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::{CheckDetails, Confidence, VerificationResult, VerificationStatus};
use crate::resolver::{DomainCache, MxResolver};
use crate::smtp::MailboxProbe;
use crate::validation::{Classified, classify};

/// How far a verification goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationPolicy {
    /// Classifier plus MX resolution. Never opens a socket; the default
    /// for bulk runs.
    MxOnly,
    /// Adds the SMTP mailbox probe against the primary MX host. Used for
    /// ad hoc single-address checks.
    Enhanced,
}

/// # Verifier
///
/// Composes the classifier, the MX resolver and the mailbox probe into
/// one verdict per address. The caller owns the domain cache, so a batch
/// can share one across addresses while single checks pass a fresh one.
pub struct Verifier {
    resolver: MxResolver,
    probe: Arc<dyn MailboxProbe>,
}

impl Verifier {
    pub fn new(resolver: MxResolver, probe: Arc<dyn MailboxProbe>) -> Self {
        Self { resolver, probe }
    }

    /// Verifies a single address under the given policy.
    pub async fn verify(
        &self,
        email: &str,
        policy: VerificationPolicy,
        cache: &mut DomainCache,
    ) -> Result<VerificationResult> {
        let email = email.trim();

        let result = match classify(email) {
            Classified::Malformed => VerificationResult::rejected(
                email,
                VerificationStatus::Invalid,
                Confidence::High,
                "Invalid email format".to_string(),
                CheckDetails::default(),
            ),
            Classified::Typo { suggestion, .. } => VerificationResult::rejected(
                email,
                VerificationStatus::Typo,
                Confidence::Medium,
                format!("Possible typo: {suggestion}"),
                CheckDetails {
                    syntax_ok: true,
                    typo: true,
                    ..CheckDetails::default()
                },
            ),
            Classified::Disposable { .. } => VerificationResult::rejected(
                email,
                VerificationStatus::Disposable,
                Confidence::High,
                "Disposable email domain".to_string(),
                CheckDetails {
                    syntax_ok: true,
                    disposable: true,
                    ..CheckDetails::default()
                },
            ),
            Classified::Candidate {
                domain, role_based, ..
            } => {
                self.verify_candidate(email, &domain, role_based, policy, cache)
                    .await?
            }
        };

        debug!(
            target: "verify_pipeline",
            email = %result.email,
            status = ?result.status,
            confidence = ?result.confidence,
            "verification finished"
        );
        Ok(result)
    }

    async fn verify_candidate(
        &self,
        email: &str,
        domain: &str,
        role_based: bool,
        policy: VerificationPolicy,
        cache: &mut DomainCache,
    ) -> Result<VerificationResult> {
        let record = self.resolver.resolve(domain, cache).await;

        let mut details = CheckDetails {
            syntax_ok: true,
            role_based,
            ..CheckDetails::default()
        };

        if !record.valid {
            return Ok(VerificationResult::rejected(
                email,
                VerificationStatus::Invalid,
                Confidence::High,
                "No MX records found for domain".to_string(),
                details,
            ));
        }
        details.mx_ok = true;

        // The MX-only verdict; Enhanced starts from it and the probe can
        // only strengthen or overturn it, never silently drop it.
        let mut valid = true;
        let mut confidence = Confidence::Medium;
        let mut reasons = Vec::new();
        let mut status = if role_based {
            reasons.push("Role-based email address".to_string());
            VerificationStatus::RoleBased
        } else {
            VerificationStatus::Valid
        };

        if policy == VerificationPolicy::Enhanced {
            if let Some(mx_host) = record.primary_mx() {
                let outcome = self.probe.probe(email, mx_host).await?;
                // Only a hard yes or no from RCPT moves the verdict; an
                // inconclusive probe cannot distinguish a missing mailbox
                // from an unreachable server, so the MX verdict stands and
                // the probe outcome is surfaced as a reason.
                if outcome.is_conclusive() {
                    confidence = Confidence::High;
                    details.smtp_ok = Some(outcome.valid);
                    if !outcome.valid {
                        valid = false;
                        status = VerificationStatus::Invalid;
                    }
                }
                if let Some(reason) = outcome.reason {
                    reasons.push(reason);
                }
            }
        }

        Ok(VerificationResult {
            email: email.to_string(),
            valid,
            status,
            confidence,
            reasons,
            details,
            mx_records: record.mx_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{MockMxLookup, MxEntry};
    use crate::smtp::{MockMailboxProbe, ProbeOutcome};

    fn verifier(lookup: MockMxLookup, probe: MockMailboxProbe) -> Verifier {
        Verifier::new(MxResolver::new(Arc::new(lookup)), Arc::new(probe))
    }

    fn single_mx() -> MockMxLookup {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().returning(|_| {
            Ok(vec![MxEntry {
                preference: 10,
                exchange: "mx1.example.com".to_string(),
            }])
        });
        lookup
    }

    #[tokio::test]
    async fn malformed_address_never_touches_the_network() {
        // Mocks without expectations panic when called
        let verifier = verifier(MockMxLookup::new(), MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("not-an-email", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.status, VerificationStatus::Invalid);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.reasons, vec!["Invalid email format".to_string()]);
        assert!(!result.details.syntax_ok);
    }

    #[tokio::test]
    async fn typo_domain_rejects_with_suggestion() {
        let verifier = verifier(MockMxLookup::new(), MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@gmial.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.status, VerificationStatus::Typo);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.reasons, vec!["Possible typo: gmail.com".to_string()]);
        assert!(result.details.typo);
        assert!(result.details.syntax_ok);
    }

    #[tokio::test]
    async fn disposable_domain_rejects_hard() {
        let verifier = verifier(MockMxLookup::new(), MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify(
                "user@mailinator.com",
                VerificationPolicy::MxOnly,
                &mut cache,
            )
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.status, VerificationStatus::Disposable);
        assert_eq!(result.confidence, Confidence::High);
        assert!(result.details.disposable);
    }

    #[tokio::test]
    async fn missing_mx_rejects_domain() {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().returning(|_| Ok(Vec::new()));
        let verifier = verifier(lookup, MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@nomx.example", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.status, VerificationStatus::Invalid);
        assert_eq!(
            result.reasons,
            vec!["No MX records found for domain".to_string()]
        );
        assert!(result.details.syntax_ok);
        assert!(!result.details.mx_ok);
        assert!(result.mx_records.is_empty());
    }

    #[tokio::test]
    async fn mx_only_personal_address_is_valid_with_medium_confidence() {
        let verifier = verifier(single_mx(), MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@example.com", VerificationPolicy::MxOnly, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.status, VerificationStatus::Valid);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.details.smtp_ok, None);
        assert_eq!(result.mx_records, vec!["mx1.example.com".to_string()]);
    }

    #[tokio::test]
    async fn mx_only_role_address_keeps_valid_with_role_status() {
        let verifier = verifier(single_mx(), MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("info@example.com", VerificationPolicy::MxOnly, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.status, VerificationStatus::RoleBased);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(
            result.reasons,
            vec!["Role-based email address".to_string()]
        );
        assert!(result.details.role_based);
    }

    #[tokio::test]
    async fn enhanced_probes_the_lowest_preference_host() {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().returning(|_| {
            Ok(vec![
                MxEntry {
                    preference: 20,
                    exchange: "backup.example.com".to_string(),
                },
                MxEntry {
                    preference: 10,
                    exchange: "primary.example.com".to_string(),
                },
            ])
        });
        let mut probe = MockMailboxProbe::new();
        probe
            .expect_probe()
            .withf(|email, mx_host| email == "user@example.com" && mx_host == "primary.example.com")
            .times(1)
            .returning(|_, _| Ok(ProbeOutcome::mailbox_exists("250 2.1.5 Ok".to_string())));
        let verifier = verifier(lookup, probe);
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@example.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.details.smtp_ok, Some(true));
    }

    #[tokio::test]
    async fn enhanced_hard_reject_overrides_to_invalid() {
        let mut probe = MockMailboxProbe::new();
        probe.expect_probe().returning(|_, _| {
            Ok(ProbeOutcome::mailbox_not_found(
                "550 5.1.1 User unknown".to_string(),
            ))
        });
        let verifier = verifier(single_mx(), probe);
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("ghost@example.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.status, VerificationStatus::Invalid);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.details.smtp_ok, Some(false));
        assert!(
            result
                .reasons
                .contains(&"Mailbox does not exist".to_string())
        );
    }

    #[tokio::test]
    async fn enhanced_blocked_provider_falls_back_to_mx_verdict() {
        let mut probe = MockMailboxProbe::new();
        probe
            .expect_probe()
            .returning(|_, _| Ok(ProbeOutcome::blocked()));
        let verifier = verifier(single_mx(), probe);
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@gmail.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.status, VerificationStatus::Valid);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.details.smtp_ok, None);
        assert!(
            result
                .reasons
                .contains(&"SMTP verification blocked for this domain".to_string())
        );
    }

    #[tokio::test]
    async fn enhanced_connection_error_falls_back_to_mx_verdict() {
        let mut probe = MockMailboxProbe::new();
        probe
            .expect_probe()
            .returning(|_, _| Ok(ProbeOutcome::connection_error("SMTP connection timed out")));
        let verifier = verifier(single_mx(), probe);
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@example.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(
            result
                .reasons
                .contains(&"SMTP connection timed out".to_string())
        );
    }

    #[tokio::test]
    async fn enhanced_indeterminate_reply_keeps_mx_verdict_with_raw_text() {
        let mut probe = MockMailboxProbe::new();
        probe.expect_probe().returning(|_, _| {
            Ok(ProbeOutcome::smtp_error("451 4.7.1 Greylisted".to_string()))
        });
        let verifier = verifier(single_mx(), probe);
        let mut cache = DomainCache::new();

        let result = verifier
            .verify("user@example.com", VerificationPolicy::Enhanced, &mut cache)
            .await
            .unwrap();

        assert!(result.valid);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(
            result.reasons,
            vec!["SMTP error: 451 4.7.1 Greylisted".to_string()]
        );
        assert_eq!(result.details.smtp_ok, None);
    }

    #[tokio::test]
    async fn repeated_domain_resolves_once_per_cache() {
        let mut lookup = MockMxLookup::new();
        lookup.expect_lookup_mx().times(1).returning(|_| {
            Ok(vec![MxEntry {
                preference: 10,
                exchange: "mx1.example.com".to_string(),
            }])
        });
        let verifier = verifier(lookup, MockMailboxProbe::new());
        let mut cache = DomainCache::new();

        for local in ["a", "b", "c"] {
            let result = verifier
                .verify(
                    &format!("{local}@example.com"),
                    VerificationPolicy::MxOnly,
                    &mut cache,
                )
                .await
                .unwrap();
            assert!(result.valid);
        }
    }
}
