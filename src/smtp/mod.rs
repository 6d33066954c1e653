/// SMTP reply-line parsing: status codes and the multi-line completeness
/// rule.
pub mod reply;

/// The probe conversation as a socket-free state machine, plus the
/// outcome types it settles on.
pub mod session;

pub use session::{ProbeDisposition, ProbeOutcome, ProbeSession};

use async_trait::async_trait;
use mockall::automock;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep_until, timeout, timeout_at};
use tracing::debug;

use crate::error::Result;

/// Providers that blanket-reject or tarpit verification probes. Probing
/// them wastes the session budget and risks blocklisting, so the probe
/// answers without opening a socket.
static BLOCKED_PROBE_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "gmail.com",
        "googlemail.com",
        "yahoo.com",
        "yahoo.co.uk",
        "ymail.com",
        "rocketmail.com",
        "hotmail.com",
        "hotmail.co.uk",
        "outlook.com",
        "live.com",
        "msn.com",
        "aol.com",
        "icloud.com",
        "me.com",
        "mac.com",
        "protonmail.com",
        "proton.me",
        "pm.me",
        "zoho.com",
        "gmx.com",
        "gmx.net",
        "gmx.de",
        "mail.com",
        "yandex.com",
        "yandex.ru",
        "mail.ru",
    ])
});

/// Whether mailbox probing is disabled for this domain.
pub fn probing_blocked(domain: &str) -> bool {
    BLOCKED_PROBE_DOMAINS.contains(domain.to_lowercase().as_str())
}

/// Wire-level settings for probe sessions.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Budget for the whole session, greeting through QUIT.
    pub timeout: Duration,
    /// Mail server port; only tests change this.
    pub port: u16,
    /// Identity announced in EHLO; the MAIL FROM sender is derived from
    /// it.
    pub helo_domain: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            port: 25,
            helo_domain: "verify.example.com".to_string(),
        }
    }
}

/// Connect budget: five seconds, but never more than half the overall
/// session budget.
pub fn connect_timeout(overall: Duration) -> Duration {
    Duration::from_secs(5).min(overall / 2)
}

/// The mailbox probing seam used by the pipeline. Production uses
/// [`SmtpProbe`]; tests substitute a mock.
#[automock]
#[async_trait]
pub trait MailboxProbe: Send + Sync {
    /// Probes whether `email` is accepted by the mail server `mx_host`.
    async fn probe(&self, email: &str, mx_host: &str) -> Result<ProbeOutcome>;
}

/// Probes mailboxes by holding a short SMTP dialogue over a raw TCP
/// connection: greeting, EHLO, MAIL FROM, RCPT TO, QUIT. The RCPT answer
/// decides the outcome; the message itself is never sent.
pub struct SmtpProbe {
    settings: ProbeSettings,
}

impl SmtpProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    async fn run_session(&self, email: &str, mx_host: &str) -> ProbeOutcome {
        let overall = self.settings.timeout;
        let address = format!("{}:{}", mx_host.trim_end_matches('.'), self.settings.port);

        let stream = match timeout(connect_timeout(overall), TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                return ProbeOutcome::connection_error(format!(
                    "Could not connect to mail server: {err}"
                ));
            }
            Err(_) => {
                return ProbeOutcome::connection_error("Connection to mail server timed out");
            }
        };
        let mut stream = stream;

        let deadline = Instant::now() + overall;
        let mut session = ProbeSession::new(email, &self.settings.helo_domain);
        let mut read_buf = [0u8; 4096];

        while !session.is_resolved() {
            tokio::select! {
                read = stream.read(&mut read_buf) => match read {
                    Ok(0) => session.connection_closed(),
                    Ok(n) => {
                        // Writes share the session deadline; a peer that
                        // stops reading cannot hold the session past it.
                        for command in session.receive(&read_buf[..n]) {
                            let write = stream.write_all(command.as_bytes());
                            match timeout_at(deadline, write).await {
                                Ok(Ok(())) => {}
                                Ok(Err(err)) => {
                                    session.io_failed(&err);
                                    break;
                                }
                                Err(_) => {
                                    session.timed_out();
                                    break;
                                }
                            }
                        }
                    }
                    Err(err) => session.io_failed(&err),
                },
                _ = sleep_until(deadline) => session.timed_out(),
            }
        }

        let _ = stream.shutdown().await;

        session
            .into_outcome()
            .unwrap_or_else(|| ProbeOutcome::connection_error("Session ended without a verdict"))
    }
}

#[async_trait]
impl MailboxProbe for SmtpProbe {
    async fn probe(&self, email: &str, mx_host: &str) -> Result<ProbeOutcome> {
        let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
        if probing_blocked(domain) {
            debug!(target: "smtp_probe", email = %email, "probing blocked for provider");
            return Ok(ProbeOutcome::blocked());
        }

        debug!(target: "smtp_probe", email = %email, mx_host = %mx_host, "starting probe session");
        let outcome = self.run_session(email, mx_host).await;
        debug!(
            target: "smtp_probe",
            email = %email,
            disposition = ?outcome.disposition,
            "probe finished"
        );
        Ok(outcome)
    }
}
