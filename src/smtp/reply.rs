/// One parsed SMTP reply line.
///
/// A reply is complete only on its final line: the line whose fourth
/// character is a space. A dash there marks a continuation line of a
/// multi-line reply, and anything else (including a bare three-digit
/// line) is treated as a continuation as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: u16,
    pub is_final: bool,
    pub raw: String,
}

impl ReplyLine {
    /// Parses one line, already stripped of its CRLF. Returns `None` when
    /// the line does not start with a three-digit status code.
    pub fn parse(line: &str) -> Option<Self> {
        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let code: u16 = line[..3].parse().ok()?;
        let is_final = bytes.get(3) == Some(&b' ');

        Some(Self {
            code,
            is_final,
            raw: line.to_string(),
        })
    }
}
