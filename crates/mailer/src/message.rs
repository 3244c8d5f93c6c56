//! MIME assembly for outgoing messages.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::config::Sender;

const LINE_WIDTH: usize = 76;

/// A message to one recipient with a plain-text and an HTML rendition.
#[derive(Debug, Clone)]
pub struct OutgoingMessage<'a> {
    pub sender: &'a Sender,
    pub recipient: &'a str,
    pub subject: &'a str,
    pub html: &'a str,
    pub text: &'a str,
}

impl<'a> OutgoingMessage<'a> {
    pub fn new(
        sender: &'a Sender,
        recipient: &'a str,
        subject: &'a str,
        html: &'a str,
        text: &'a str,
    ) -> Self {
        Self {
            sender,
            recipient,
            subject,
            html,
            text,
        }
    }

    /// Render the full message with a fresh boundary.
    pub fn render(&self) -> String {
        let boundary = format!("=_brief_{}", Uuid::new_v4().simple());
        self.render_with_boundary(&boundary)
    }

    /// Render the full message, CRLF-terminated, without the DATA terminator.
    pub fn render_with_boundary(&self, boundary: &str) -> String {
        let mut out = String::new();

        push_line(&mut out, &format!("From: {}", from_header(self.sender)));
        push_line(&mut out, &format!("To: <{}>", single_line(self.recipient)));
        push_line(&mut out, &format!("Subject: {}", encode_header(&single_line(self.subject))));
        push_line(&mut out, "MIME-Version: 1.0");
        push_line(
            &mut out,
            &format!("Content-Type: multipart/alternative; boundary=\"{}\"", boundary),
        );
        push_line(
            &mut out,
            &format!("X-Mailer: brief-mailer/{}", env!("CARGO_PKG_VERSION")),
        );
        push_line(&mut out, "");

        for (mime, body) in [("text/plain", self.text), ("text/html", self.html)] {
            push_line(&mut out, &format!("--{}", boundary));
            push_line(&mut out, &format!("Content-Type: {}; charset=UTF-8", mime));
            push_line(&mut out, "Content-Transfer-Encoding: base64");
            push_line(&mut out, "");
            for chunk in wrap_base64(body) {
                push_line(&mut out, &chunk);
            }
        }
        push_line(&mut out, &format!("--{}--", boundary));

        out
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

fn from_header(sender: &Sender) -> String {
    match &sender.name {
        Some(name) if name.is_ascii() => {
            let escaped = single_line(name).replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\" <{}>", escaped, single_line(&sender.address))
        }
        Some(name) => format!(
            "{} <{}>",
            encode_header(&single_line(name)),
            single_line(&sender.address)
        ),
        None => format!("<{}>", single_line(&sender.address)),
    }
}

// Header values must not carry line breaks.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-word for non-ASCII header text; ASCII passes through.
pub(crate) fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn wrap_base64(body: &str) -> Vec<String> {
    let encoded = STANDARD.encode(body.as_bytes());
    encoded
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// Normalize line endings to CRLF and dot-stuff lines for the DATA phase.
///
/// The result always ends with CRLF so the `.` terminator sits on its own line.
pub(crate) fn prepare_data(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 16);
    let normalized = message.replace("\r\n", "\n").replace('\r', "\n");
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);

    for line in body.split('\n') {
        if line.starts_with('.') {
            out.push('.');
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Sender {
        Sender::new("brief@example.com", Some("Contracting Brief".to_string()))
    }

    #[test]
    fn test_headers_and_parts() {
        let sender = sender();
        let message = OutgoingMessage::new(&sender, "dana@agency.gov", "Daily brief", "<p>Hi</p>", "Hi")
            .render_with_boundary("BOUNDARY");

        assert!(message.starts_with("From: \"Contracting Brief\" <brief@example.com>\r\n"));
        assert!(message.contains("\r\nTo: <dana@agency.gov>\r\n"));
        assert!(message.contains("\r\nSubject: Daily brief\r\n"));
        assert!(message.contains("\r\nMIME-Version: 1.0\r\n"));
        assert!(message.contains("Content-Type: multipart/alternative; boundary=\"BOUNDARY\"\r\n"));
        assert!(message.contains("\r\nX-Mailer: brief-mailer/"));
        assert!(message.contains("Content-Type: text/plain; charset=UTF-8\r\n"));
        assert!(message.contains("Content-Type: text/html; charset=UTF-8\r\n"));
        assert!(message.contains(&STANDARD.encode("<p>Hi</p>")));
        assert!(message.ends_with("--BOUNDARY--\r\n"));

        let plain = message.find("text/plain").unwrap();
        let html = message.find("text/html").unwrap();
        assert!(plain < html);
    }

    #[test]
    fn test_fresh_boundary_per_render() {
        let sender = sender();
        let message = OutgoingMessage::new(&sender, "a@b.c", "s", "h", "t");
        assert_ne!(message.render(), message.render());
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        assert_eq!(encode_header("Plain"), "Plain");
        let encoded = encode_header("Résumé");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_header_injection_is_flattened() {
        let sender = sender();
        let message = OutgoingMessage::new(&sender, "a@b.c", "Hi\r\nBcc: x@y.z", "h", "t")
            .render_with_boundary("B");
        assert!(message.contains("Subject: Hi  Bcc: x@y.z\r\n"));
    }

    #[test]
    fn test_base64_lines_are_wrapped() {
        let long = "x".repeat(500);
        for line in wrap_base64(&long) {
            assert!(line.len() <= LINE_WIDTH);
        }
    }

    #[test]
    fn test_prepare_data_stuffs_and_normalizes() {
        assert_eq!(prepare_data("a\n.b\r\nc"), "a\r\n..b\r\nc\r\n");
        assert_eq!(prepare_data("a\r\n"), "a\r\n");
        assert_eq!(prepare_data(".\n"), "..\r\n");
    }
}
