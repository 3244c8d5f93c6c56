//! Deterministic analyzers for the contracting brief.
//!
//! This crate provides implementations of the `Analyzer` trait that need no
//! network access:
//! - `RuleAnalyzer` - Program-specific canned insight plus seasonal insight
//! - `FallbackAnalyzer` - Tries a primary analyzer and falls back on error
//!
//! For AI-generated narrative, use the `ai-analyzer` crate and wrap it in a
//! `FallbackAnalyzer` with a `RuleAnalyzer` fallback.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rule_analyzer::{AnalysisRequest, Analyzer, InsightPrompt, RuleAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rule_analyzer::AnalyzerError> {
//!     let analyzer = RuleAnalyzer::new();
//!     let request = AnalysisRequest {
//!         program_code: "sewp",
//!         program_name: "NASA SEWP V",
//!         keywords: &[],
//!         news: &[],
//!         new_opportunities: &[],
//!         closing_soon: &[],
//!         today: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
//!     };
//!
//!     let text = analyzer.analyze(&request, InsightPrompt::WhatThisMeans).await?;
//!     assert!(text.contains("fiscal year-end"));
//!     Ok(())
//! }
//! ```

mod fallback;
mod rules;

pub use brief_core::{async_trait, AnalysisRequest, Analyzer, AnalyzerError, InsightPrompt};

pub use fallback::FallbackAnalyzer;
pub use rules::{program_insight, seasonal_insight, RuleAnalyzer};
