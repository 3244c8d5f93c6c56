//! Builds the daily federal contracting brief.
//!
//! [`BriefAggregator`] walks the [`ProgramRegistry`], reads each program's
//! news and solicitations from a [`ContentStore`](brief_core::ContentStore),
//! classifies news with the [`ReliabilityClassifier`](brief_core::ReliabilityClassifier),
//! asks an [`Analyzer`](brief_core::Analyzer) for narrative, and saves one
//! brief per day through a [`BriefRepository`](brief_core::BriefRepository).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use brief_builder::{BriefAggregator, BuildOutcome, ProgramRegistry};
//! use brief_core::ReliabilityClassifier;
//! use database::Database;
//! use rule_analyzer::RuleAnalyzer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(Database::connect("sqlite:briefs.db?mode=rwc").await?);
//!     db.migrate().await?;
//!
//!     let aggregator = BriefAggregator::new(
//!         ProgramRegistry::standard(),
//!         ReliabilityClassifier::default(),
//!         db.clone(),
//!         db.clone(),
//!         Arc::new(RuleAnalyzer::new()),
//!     );
//!
//!     if let BuildOutcome::Built { id, .. } = aggregator.build().await? {
//!         println!("built brief {id}");
//!     }
//!     Ok(())
//! }
//! ```

mod adapters;
mod aggregator;
mod error;
mod registry;
pub mod render;

pub use adapters::{OasisAdapter, SewpAdapter, TlsAdapter};
pub use aggregator::{BriefAggregator, BuildOutcome, CLOSING_WINDOW_DAYS, LOOKBACK_HOURS};
pub use error::BuildError;
pub use registry::{Adapter, ProgramRegistry};
