//! Brief distribution for the contracting brief pipeline.
//!
//! This crate provides [`SendOrchestrator`], which sends one unsent brief to
//! every active subscriber, one message at a time, and records the outcome.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use broadcaster::SendOrchestrator;
//! use database::Database;
//! use mailer::MailTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Arc::new(Database::connect("sqlite:briefs.db?mode=rwc").await?);
//! let mailer = Arc::new(MailTransport::from_env()?);
//!
//! let orchestrator = SendOrchestrator::new(db.clone(), db.clone(), mailer);
//! let report = orchestrator.send_pending().await?;
//! println!("sent {} of {}", report.sent, report.total);
//! # Ok(())
//! # }
//! ```

mod error;
mod orchestrator;
pub mod render;

pub use error::{Result, SendError};
pub use orchestrator::{SendOrchestrator, SendReport, DEFAULT_SEND_DELAY, MAX_REPORTED_ERRORS};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
