//! The Analyzer trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AnalyzerError;
use crate::model::{ContentItem, Solicitation};

/// Which narrative block to produce for a program section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightPrompt {
    /// "What this means" for the program's pursuit teams.
    WhatThisMeans,
    /// Concrete "next actions" for the coming days.
    NextActions,
}

impl InsightPrompt {
    /// Heading used when the block is rendered.
    pub fn heading(&self) -> &'static str {
        match self {
            InsightPrompt::WhatThisMeans => "What This Means",
            InsightPrompt::NextActions => "Next Actions",
        }
    }
}

/// Everything an analyzer may look at for one program.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub program_code: &'a str,
    pub program_name: &'a str,
    pub keywords: &'a [String],
    pub news: &'a [ContentItem],
    pub new_opportunities: &'a [Solicitation],
    pub closing_soon: &'a [Solicitation],
    /// Day the brief is built for; seasonal rules key off its month.
    pub today: NaiveDate,
}

/// A pluggable narrative-generation strategy.
///
/// Implementations can be AI-backed or fully deterministic. This trait is
/// object-safe and can be used with `Arc<dyn Analyzer>`.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce the narrative text for one prompt.
    async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        prompt: InsightPrompt,
    ) -> Result<String, AnalyzerError>;

    /// Get a human-readable name for this analyzer implementation.
    fn name(&self) -> &str;
}
