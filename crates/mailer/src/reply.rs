//! SMTP reply parsing.

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{MailError, SmtpStage};

/// A complete, possibly multi-line, server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// Whether the reply code is one of `codes`.
    pub fn is_one_of(&self, codes: &[u16]) -> bool {
        codes.contains(&self.code)
    }

    /// Permanent negative completion (5xx).
    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.lines.join(" / "))
    }
}

/// Read one reply, failing with [`MailError::Timeout`] if it does not arrive in time.
pub(crate) async fn read_reply<R>(
    reader: &mut R,
    stage: SmtpStage,
    timeout: Duration,
) -> Result<Reply, MailError>
where
    R: AsyncBufRead + Unpin,
{
    tokio::time::timeout(timeout, read_lines(reader, stage))
        .await
        .map_err(|_| MailError::Timeout(stage))?
}

async fn read_lines<R>(reader: &mut R, stage: SmtpStage) -> Result<Reply, MailError>
where
    R: AsyncBufRead + Unpin,
{
    let mut code = None;
    let mut lines = Vec::new();

    loop {
        let mut raw = String::new();
        if reader.read_line(&mut raw).await? == 0 {
            return Err(MailError::Connection(format!(
                "server closed the connection during {}",
                stage
            )));
        }

        let line = raw.trim_end_matches(['\r', '\n']);
        let (line_code, last, text) = parse_line(line).ok_or_else(|| MailError::MalformedReply {
            stage,
            line: line.to_string(),
        })?;

        match code {
            Some(c) if c != line_code => {
                return Err(MailError::MalformedReply {
                    stage,
                    line: line.to_string(),
                })
            }
            _ => code = Some(line_code),
        }
        lines.push(text.to_string());

        if last {
            return Ok(Reply {
                code: line_code,
                lines,
            });
        }
    }
}

/// Split `NNN-text` / `NNN text` / `NNN` into code, final-line flag and text.
fn parse_line(line: &str) -> Option<(u16, bool, &str)> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = digits.parse().ok()?;

    match line.as_bytes().get(3) {
        None => Some((code, true, "")),
        Some(b' ') => Some((code, true, &line[4..])),
        Some(b'-') => Some((code, false, &line[4..])),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_single_line_reply() {
        let mut input: &[u8] = b"220 mail.example.com ESMTP ready\r\n";
        let reply = read_reply(&mut input, SmtpStage::Greeting, TIMEOUT).await.unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.lines, vec!["mail.example.com ESMTP ready"]);
    }

    #[tokio::test]
    async fn test_multi_line_reply() {
        let mut input: &[u8] = b"250-mail.example.com\r\n250-STARTTLS\r\n250 AUTH LOGIN PLAIN\r\n";
        let reply = read_reply(&mut input, SmtpStage::Ehlo, TIMEOUT).await.unwrap();
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines.len(), 3);
        assert_eq!(reply.lines[2], "AUTH LOGIN PLAIN");
    }

    #[tokio::test]
    async fn test_bare_code_reply() {
        let mut input: &[u8] = b"354\r\n";
        let reply = read_reply(&mut input, SmtpStage::Data, TIMEOUT).await.unwrap();
        assert_eq!(reply.code, 354);
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let mut input: &[u8] = b"hello there\r\n";
        let result = read_reply(&mut input, SmtpStage::Greeting, TIMEOUT).await;
        assert!(matches!(result, Err(MailError::MalformedReply { .. })));

        let mut input: &[u8] = b"+25 ok\r\n";
        let result = read_reply(&mut input, SmtpStage::Greeting, TIMEOUT).await;
        assert!(matches!(result, Err(MailError::MalformedReply { .. })));
    }

    #[tokio::test]
    async fn test_mixed_codes_are_malformed() {
        let mut input: &[u8] = b"250-first\r\n251 second\r\n";
        let result = read_reply(&mut input, SmtpStage::Ehlo, TIMEOUT).await;
        assert!(matches!(result, Err(MailError::MalformedReply { .. })));
    }

    #[tokio::test]
    async fn test_eof_is_connection_error() {
        let mut input: &[u8] = b"250-partial\r\n";
        let result = read_reply(&mut input, SmtpStage::Ehlo, TIMEOUT).await;
        assert!(matches!(result, Err(MailError::Connection(_))));
    }
}
