//! AI-backed analyzer for the contracting brief.
//!
//! `AiAnalyzer` implements the `Analyzer` trait by sending one chat
//! completion request per prompt to an OpenAI-compatible API.
//!
//! # Example
//!
//! ```no_run
//! use ai_analyzer::{AiAnalyzer, AiAnalyzerConfig};
//! use rule_analyzer::{FallbackAnalyzer, RuleAnalyzer};
//!
//! # fn main() -> Result<(), brief_core::AnalyzerError> {
//! let ai = AiAnalyzer::new(AiAnalyzerConfig::from_env()?)?;
//! let analyzer = FallbackAnalyzer::new(ai, RuleAnalyzer::new());
//! # Ok(())
//! # }
//! ```

pub mod api_types;
mod analyzer;
mod config;
mod prompt;

pub use analyzer::AiAnalyzer;
pub use config::AiAnalyzerConfig;
pub use prompt::{build_messages, SYSTEM_PROMPT};
