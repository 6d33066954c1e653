use super::reply::ReplyLine;

/// How a finished probe classified the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDisposition {
    /// RCPT was accepted with 250.
    MailboxExists,
    /// RCPT came back 550, 551 or 553.
    MailboxNotFound,
    /// The recipient domain is on the probe-blocked provider list.
    Blocked,
    /// The server answered but not conclusively (greylisting, policy
    /// rejections, unexpected codes).
    SmtpError,
    /// The conversation never produced an RCPT verdict: connect failure,
    /// timeout, or the peer vanished early.
    ConnectionError,
}

/// Terminal result of one probe session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub valid: bool,
    pub disposition: ProbeDisposition,
    pub reason: Option<String>,
    pub smtp_response: Option<String>,
}

impl ProbeOutcome {
    pub fn mailbox_exists(response: String) -> Self {
        Self {
            valid: true,
            disposition: ProbeDisposition::MailboxExists,
            reason: None,
            smtp_response: Some(response),
        }
    }

    pub fn mailbox_not_found(response: String) -> Self {
        Self {
            valid: false,
            disposition: ProbeDisposition::MailboxNotFound,
            reason: Some("Mailbox does not exist".to_string()),
            smtp_response: Some(response),
        }
    }

    pub fn smtp_error(response: String) -> Self {
        Self {
            valid: false,
            disposition: ProbeDisposition::SmtpError,
            reason: Some(format!("SMTP error: {response}")),
            smtp_response: Some(response),
        }
    }

    pub fn connection_error(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            disposition: ProbeDisposition::ConnectionError,
            reason: Some(reason.into()),
            smtp_response: None,
        }
    }

    pub fn blocked() -> Self {
        Self {
            valid: false,
            disposition: ProbeDisposition::Blocked,
            reason: Some("SMTP verification blocked for this domain".to_string()),
            smtp_response: None,
        }
    }

    /// Whether this outcome is a hard yes or a hard no. Everything else
    /// leaves the mailbox question open.
    pub fn is_conclusive(&self) -> bool {
        matches!(
            self.disposition,
            ProbeDisposition::MailboxExists | ProbeDisposition::MailboxNotFound
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Connected,
    Ehlo,
    MailFrom,
    RcptTo,
    Quit,
}

/// The SMTP probe conversation as a plain state machine, decoupled from
/// the socket. The driver feeds it received bytes and lifecycle events
/// (close, timeout, I/O failure); it answers with command strings to
/// write and eventually settles on exactly one [`ProbeOutcome`].
///
/// Received bytes are buffered and split on CRLF; a trailing fragment is
/// carried until the rest of its line arrives. Completion is one-shot:
/// whichever event settles the session first wins, and every later event
/// is ignored.
pub struct ProbeSession {
    email: String,
    helo_domain: String,
    sender: String,
    state: ProbeState,
    buffer: Vec<u8>,
    rcpt_reply: Option<(u16, String)>,
    outcome: Option<ProbeOutcome>,
}

impl ProbeSession {
    /// A session ready to consume the server greeting. `sender` for
    /// `MAIL FROM` is derived from the HELO identity.
    pub fn new(email: &str, helo_domain: &str) -> Self {
        Self {
            email: email.to_string(),
            helo_domain: helo_domain.to_string(),
            sender: format!("verify@{helo_domain}"),
            state: ProbeState::Connected,
            buffer: Vec::new(),
            rcpt_reply: None,
            outcome: None,
        }
    }

    /// Feeds one chunk of received bytes. Returns the commands to send,
    /// in order, each already CRLF-terminated.
    pub fn receive(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut commands = Vec::new();
        while self.outcome.is_none() {
            let Some(pos) = find_crlf(&self.buffer) else {
                break;
            };
            let line_bytes: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            let line = String::from_utf8_lossy(&line_bytes[..pos]).into_owned();
            if let Some(command) = self.handle_line(&line) {
                commands.push(command);
            }
        }
        commands
    }

    fn handle_line(&mut self, line: &str) -> Option<String> {
        let Some(reply) = ReplyLine::parse(line) else {
            // Unparseable server output; fall back to whatever the RCPT
            // stage already established, otherwise give up on the session.
            if self.rcpt_reply.is_some() {
                self.resolve_from_rcpt();
            } else {
                self.complete(ProbeOutcome::smtp_error(line.to_string()));
            }
            return None;
        };

        if !reply.is_final {
            return None;
        }

        match self.state {
            ProbeState::Connected => {
                if reply.code == 220 {
                    self.state = ProbeState::Ehlo;
                    Some(format!("EHLO {}\r\n", self.helo_domain))
                } else {
                    self.complete(ProbeOutcome::smtp_error(line.to_string()));
                    None
                }
            }
            ProbeState::Ehlo => {
                if reply.code == 250 {
                    self.state = ProbeState::MailFrom;
                    Some(format!("MAIL FROM:<{}>\r\n", self.sender))
                } else {
                    self.complete(ProbeOutcome::smtp_error(line.to_string()));
                    None
                }
            }
            ProbeState::MailFrom => {
                if reply.code == 250 {
                    self.state = ProbeState::RcptTo;
                    Some(format!("RCPT TO:<{}>\r\n", self.email))
                } else {
                    self.complete(ProbeOutcome::smtp_error(line.to_string()));
                    None
                }
            }
            ProbeState::RcptTo => {
                // Record the verdict but close the dialogue politely; the
                // outcome is settled when QUIT is answered or the peer
                // hangs up.
                self.rcpt_reply = Some((reply.code, line.to_string()));
                self.state = ProbeState::Quit;
                Some("QUIT\r\n".to_string())
            }
            ProbeState::Quit => {
                self.resolve_from_rcpt();
                None
            }
        }
    }

    /// The peer closed the connection. After the RCPT reply this is a
    /// normal way for the dialogue to end and the recorded code decides
    /// the outcome; before it, the session is unusable.
    pub fn connection_closed(&mut self) {
        if self.rcpt_reply.is_some() {
            self.resolve_from_rcpt();
        } else {
            self.complete(ProbeOutcome::connection_error(
                "Connection closed by mail server",
            ));
        }
    }

    /// The overall session budget ran out.
    pub fn timed_out(&mut self) {
        self.complete(ProbeOutcome::connection_error("SMTP connection timed out"));
    }

    /// A read or write on the socket failed.
    pub fn io_failed(&mut self, error: &std::io::Error) {
        if self.rcpt_reply.is_some() {
            self.resolve_from_rcpt();
        } else {
            self.complete(ProbeOutcome::connection_error(format!(
                "SMTP connection error: {error}"
            )));
        }
    }

    fn resolve_from_rcpt(&mut self) {
        let Some((code, raw)) = self.rcpt_reply.clone() else {
            return;
        };
        let outcome = match code {
            250 => ProbeOutcome::mailbox_exists(raw),
            550 | 551 | 553 => ProbeOutcome::mailbox_not_found(raw),
            _ => ProbeOutcome::smtp_error(raw),
        };
        self.complete(outcome);
    }

    /// One-shot completion guard. The first settlement sticks; any event
    /// arriving afterwards is dropped here.
    fn complete(&mut self, outcome: ProbeOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&ProbeOutcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<ProbeOutcome> {
        self.outcome
    }
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\r\n")
}
