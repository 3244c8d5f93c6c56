//! # mailer
//!
//! Delivers one message per call, either over SMTP or through the local
//! `sendmail` program when no SMTP host is configured.
//!
//! The SMTP client opens a fresh connection for every message and walks an
//! explicit [`Session`] state machine: greeting, EHLO, optional STARTTLS,
//! optional AUTH LOGIN, envelope, DATA and QUIT. Any unexpected reply aborts
//! the exchange and closes the socket.
//!
//! ## Sending Email
//!
//! ```no_run
//! use mailer::{MailTransport, Mailer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), brief_core::MailError> {
//!     let transport = MailTransport::from_env()?;
//!
//!     let ok = transport
//!         .send("analyst@agency.gov", "Daily brief", "<p>Hello</p>", "Hello")
//!         .await;
//!     println!("delivered: {ok}");
//!
//!     Ok(())
//! }
//! ```

mod config;
mod message;
mod reply;
mod sendmail;
mod session;
mod smtp;
mod transport;

pub use brief_core::{MailError, Mailer, SmtpStage};
pub use config::{Encryption, Sender, SmtpConfig};
pub use message::OutgoingMessage;
pub use reply::Reply;
pub use sendmail::SendmailTransport;
pub use session::{
    Authenticated, Connected, DataReady, EnvelopeFrom, EnvelopeTo, Greeted, Negotiated, Sent,
    Session, State, Stream,
};
pub use smtp::SmtpTransport;
pub use transport::MailTransport;
