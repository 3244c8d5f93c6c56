//! Core types and traits for the daily contracting brief.
//!
//! This crate provides the shared vocabulary for every other crate in the
//! workspace. It defines:
//!
//! - [`ReliabilityClassifier`] - Assigns a [`ReliabilityTier`] to fetched content
//! - [`BriefDocument`] / [`BriefSection`] - The aggregated daily digest
//! - [`Analyzer`] - Pluggable narrative generation ("what this means", "next actions")
//! - [`Mailer`] - Outbound mail delivery, one message per call
//! - [`BriefRepository`], [`ContentStore`], [`SubscriberDirectory`] - Storage seams
//!
//! # Example
//!
//! ```rust
//! use brief_core::{ContentItem, ReliabilityClassifier, ReliabilityTier};
//! use chrono::Utc;
//!
//! let classifier = ReliabilityClassifier::default();
//! let item = ContentItem::new(
//!     "GSA awards OASIS+ on-ramp contracts",
//!     "The agency published the list of awardees.",
//!     "https://example.com/oasis",
//!     "Industry Daily",
//!     Utc::now(),
//! );
//!
//! assert_eq!(classifier.classify(&item), ReliabilityTier::Confirmed);
//! ```

mod analyzer;
mod classifier;
mod error;
mod mailer;
mod model;
mod store;

pub use analyzer::{AnalysisRequest, Analyzer, InsightPrompt};
pub use classifier::{
    ClassifierRules, ReliabilityClassifier, CONFIRMED_KEYWORDS, DEFAULT_HIGH_RELIABILITY_SOURCES,
    SIGNAL_KEYWORDS,
};
pub use error::{AnalyzerError, MailError, SmtpStage, StoreError};
pub use mailer::Mailer;
pub use model::{
    BriefDocument, BriefSection, ContentItem, NewBrief, ParseTierError, Program, RawSolicitation,
    ReliabilityTier, SendResult, Solicitation, Subscriber,
};
pub use store::{BriefRepository, ContentStore, SolicitationFilter, SubscriberDirectory};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
