//! SMTP client tests against a scripted in-process server.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mailer::{Encryption, MailError, Mailer, Sender, SmtpConfig, SmtpStage, SmtpTransport};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the fake server received.
#[derive(Debug, Default)]
struct Transcript {
    commands: Vec<String>,
    message: Option<String>,
}

/// Accept one connection, send `greeting`, then answer each received command
/// (or the whole DATA block after a 354) with the next scripted reply.
async fn fake_server(greeting: &'static str, replies: Vec<&'static str>) -> (u16, JoinHandle<Transcript>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        let mut transcript = Transcript::default();

        write.write_all(format!("{greeting}\r\n").as_bytes()).await.unwrap();

        let mut in_data = false;
        for reply in replies {
            if in_data {
                let mut message = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 || line == ".\r\n" {
                        break;
                    }
                    message.push_str(&line);
                }
                transcript.message = Some(message);
                in_data = false;
            } else {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    return transcript;
                }
                let command = line.trim_end().to_string();
                in_data = command == "DATA" && reply.starts_with("354");
                transcript.commands.push(command);
            }
            if write.write_all(format!("{reply}\r\n").as_bytes()).await.is_err() {
                return transcript;
            }
        }

        // Record anything else the client sends until it hangs up.
        let mut line = String::new();
        while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
            transcript.commands.push(line.trim_end().to_string());
            line.clear();
        }
        transcript
    });

    (port, handle)
}

fn config(port: u16) -> SmtpConfig {
    SmtpConfig::new("127.0.0.1", port)
        .with_encryption(Encryption::None)
        .with_timeout(Duration::from_secs(5))
        .with_helo_name("brief.test")
        .with_sender(Sender::new("brief@example.com", Some("Contracting Brief".to_string())))
}

const EHLO_REPLY: &str = "250-fake.test greets brief.test\r\n250-AUTH LOGIN PLAIN\r\n250 8BITMIME";

#[tokio::test]
async fn test_full_exchange_with_auth() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![
            EHLO_REPLY,
            "334 VXNlcm5hbWU6",
            "334 UGFzc3dvcmQ6",
            "235 2.7.0 Authentication successful",
            "250 OK",
            "250 OK",
            "354 End data with <CR><LF>.<CR><LF>",
            "250 OK queued",
            "221 Bye",
        ],
    )
    .await;

    let transport = SmtpTransport::new(config(port).with_credentials("user", "secret"));
    let ok = transport
        .send("analyst@agency.gov", "Daily brief", "<p>Hello Dana</p>", "Hello Dana")
        .await;
    assert!(ok);

    let transcript = server.await.unwrap();
    assert_eq!(
        transcript.commands,
        vec![
            "EHLO brief.test".to_string(),
            "AUTH LOGIN".to_string(),
            STANDARD.encode("user"),
            STANDARD.encode("secret"),
            "MAIL FROM:<brief@example.com>".to_string(),
            "RCPT TO:<analyst@agency.gov>".to_string(),
            "DATA".to_string(),
            "QUIT".to_string(),
        ]
    );

    let message = transcript.message.unwrap();
    assert!(message.contains("To: <analyst@agency.gov>\r\n"));
    assert!(message.contains("Subject: Daily brief\r\n"));
    assert!(message.contains("Content-Type: multipart/alternative; boundary="));
    assert!(message.contains(&STANDARD.encode("Hello Dana")));
    assert!(message.contains(&STANDARD.encode("<p>Hello Dana</p>")));
}

#[tokio::test]
async fn test_without_credentials_skips_auth() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![EHLO_REPLY, "250 OK", "251 User not local; will forward", "354 Go ahead", "250 OK", "221 Bye"],
    )
    .await;

    let transport = SmtpTransport::new(config(port));
    transport
        .try_send("analyst@agency.gov", "Daily brief", "<p>x</p>", "x")
        .await
        .unwrap();

    let transcript = server.await.unwrap();
    assert!(!transcript.commands.iter().any(|c| c.starts_with("AUTH")));
    assert_eq!(transcript.commands[1], "MAIL FROM:<brief@example.com>");
}

#[tokio::test]
async fn test_rejected_greeting_sends_nothing() {
    let (port, server) = fake_server("554 Error", vec![EHLO_REPLY]).await;

    let transport = SmtpTransport::new(config(port));
    assert!(!transport.send("analyst@agency.gov", "Daily brief", "h", "t").await);

    let transcript = server.await.unwrap();
    assert!(transcript.commands.is_empty());
}

#[tokio::test]
async fn test_rejected_greeting_error_kind() {
    let (port, _server) = fake_server("554 Error", vec![]).await;

    let transport = SmtpTransport::new(config(port));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(
        result,
        Err(MailError::UnexpectedReply {
            stage: SmtpStage::Greeting,
            ..
        })
    ));
}

#[tokio::test]
async fn test_auth_rejection() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![
            EHLO_REPLY,
            "334 VXNlcm5hbWU6",
            "334 UGFzc3dvcmQ6",
            "535 5.7.8 Authentication credentials invalid",
        ],
    )
    .await;

    let transport = SmtpTransport::new(config(port).with_credentials("user", "wrong"));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(result, Err(MailError::Auth(_))));

    let transcript = server.await.unwrap();
    assert!(!transcript.commands.iter().any(|c| c.starts_with("MAIL FROM")));
}

#[tokio::test]
async fn test_rejected_recipient_stops_before_data() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![EHLO_REPLY, "250 OK", "550 5.1.1 No such user"],
    )
    .await;

    let transport = SmtpTransport::new(config(port));
    assert!(!transport.send("nobody@agency.gov", "s", "h", "t").await);

    let transcript = server.await.unwrap();
    assert_eq!(transcript.commands.last().map(String::as_str), Some("RCPT TO:<nobody@agency.gov>"));
}

#[tokio::test]
async fn test_rejected_message_fails() {
    let (port, _server) = fake_server(
        "220 fake.test ESMTP",
        vec![EHLO_REPLY, "250 OK", "250 OK", "354 Go ahead", "552 Message too large"],
    )
    .await;

    let transport = SmtpTransport::new(config(port));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(
        result,
        Err(MailError::UnexpectedReply {
            stage: SmtpStage::Message,
            ..
        })
    ));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let transport = SmtpTransport::new(config(port).with_timeout(Duration::from_millis(200)));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(result, Err(MailError::Timeout(SmtpStage::Greeting))));
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = SmtpTransport::new(config(port));
    let result = transport.deliver("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(result, Err(MailError::Connection(_))));
}

#[tokio::test]
async fn test_starttls_refused_stops_session() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![
            "250-fake.test greets brief.test\r\n250 STARTTLS",
            "454 4.7.0 TLS not available",
        ],
    )
    .await;

    let transport = SmtpTransport::new(config(port).with_encryption(Encryption::StartTls));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(
        result,
        Err(MailError::UnexpectedReply {
            stage: SmtpStage::StartTls,
            ..
        })
    ));

    let transcript = server.await.unwrap();
    assert_eq!(transcript.commands, vec!["EHLO brief.test", "STARTTLS"]);
}

#[tokio::test]
async fn test_starttls_refused_send_returns_false() {
    let (port, _server) = fake_server(
        "220 fake.test ESMTP",
        vec!["250 fake.test", "454 4.7.0 TLS not available"],
    )
    .await;

    let transport = SmtpTransport::new(config(port).with_encryption(Encryption::StartTls));
    assert!(!transport.send("analyst@agency.gov", "s", "h", "t").await);
}

#[tokio::test]
async fn test_rejected_ehlo_stops_session() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec!["550 5.7.1 Client host rejected"],
    )
    .await;

    let transport = SmtpTransport::new(config(port).with_credentials("user", "secret"));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(
        result,
        Err(MailError::UnexpectedReply {
            stage: SmtpStage::Ehlo,
            ..
        })
    ));

    let transcript = server.await.unwrap();
    assert_eq!(transcript.commands, vec!["EHLO brief.test"]);
}

#[tokio::test]
async fn test_rejected_sender_stops_before_recipient() {
    let (port, server) = fake_server(
        "220 fake.test ESMTP",
        vec![EHLO_REPLY, "553 5.1.8 Sender address rejected"],
    )
    .await;

    let transport = SmtpTransport::new(config(port));
    let result = transport.try_send("analyst@agency.gov", "s", "h", "t").await;
    assert!(matches!(
        result,
        Err(MailError::UnexpectedReply {
            stage: SmtpStage::MailFrom,
            ..
        })
    ));

    let transcript = server.await.unwrap();
    assert_eq!(
        transcript.commands,
        vec!["EHLO brief.test", "MAIL FROM:<brief@example.com>"]
    );
}
