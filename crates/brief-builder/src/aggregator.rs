//! BriefAggregator: builds and saves the daily brief.

use std::sync::Arc;

use brief_core::{
    AnalysisRequest, Analyzer, BriefRepository, ContentStore, InsightPrompt, Program,
    ReliabilityClassifier, Solicitation, SolicitationFilter, StoreError,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::BuildError;
use crate::registry::{Adapter, ProgramRegistry};
use crate::render::{self, ClassifiedNews, SectionParts};

/// How far back news and solicitation updates are read.
pub const LOOKBACK_HOURS: i64 = 24;
/// Closing-soon window, in days from today inclusive.
pub const CLOSING_WINDOW_DAYS: i64 = 7;

/// Result of a build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A new brief was saved.
    Built {
        id: i64,
        sections: usize,
        item_count: usize,
    },
    /// A brief already exists for the day; nothing was written.
    AlreadyBuilt,
    /// No program or general news had any items; nothing was written.
    NothingToReport,
}

/// Builds one brief per day from the content store.
pub struct BriefAggregator {
    registry: ProgramRegistry,
    classifier: ReliabilityClassifier,
    content: Arc<dyn ContentStore>,
    briefs: Arc<dyn BriefRepository>,
    analyzer: Arc<dyn Analyzer>,
}

impl BriefAggregator {
    pub fn new(
        registry: ProgramRegistry,
        classifier: ReliabilityClassifier,
        content: Arc<dyn ContentStore>,
        briefs: Arc<dyn BriefRepository>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            registry,
            classifier,
            content,
            briefs,
            analyzer,
        }
    }

    /// Build today's brief.
    pub async fn build(&self) -> Result<BuildOutcome, BuildError> {
        self.build_at(Utc::now()).await
    }

    /// Build the brief for the day containing `now`.
    ///
    /// Program failures are logged and skipped; repository failures are returned.
    #[instrument(skip(self), fields(analyzer = self.analyzer.name()))]
    pub async fn build_at(&self, now: DateTime<Utc>) -> Result<BuildOutcome, BuildError> {
        let today = now.date_naive();

        if self.briefs.exists_for_day(today).await? {
            info!(brief_date = %today, "Brief already built, nothing to do");
            return Ok(BuildOutcome::AlreadyBuilt);
        }

        let mut sections = Vec::new();

        for adapter in self.registry.adapters() {
            match self.program_section(adapter, now).await {
                Ok(Some(section)) => {
                    info!(program = adapter.code(), items = section.item_count, "Built section");
                    sections.push(section);
                }
                Ok(None) => debug!(program = adapter.code(), "No items, skipping section"),
                Err(e) => warn!(program = adapter.code(), error = %e, "Skipping program"),
            }
        }

        match self.general_section(now).await {
            Ok(Some(section)) => sections.push(section),
            Ok(None) => debug!("No unattributed news"),
            Err(e) => warn!(error = %e, "Skipping general section"),
        }

        if sections.is_empty() {
            info!(brief_date = %today, "No content for today, brief not created");
            return Ok(BuildOutcome::NothingToReport);
        }

        let brief = render::compose(today, now, sections);
        let item_count = brief.item_count();
        let section_count = brief.sections.len();

        match self.briefs.save(&brief).await {
            Ok(id) => {
                info!(brief_id = id, sections = section_count, items = item_count, "Brief saved");
                Ok(BuildOutcome::Built {
                    id,
                    sections: section_count,
                    item_count,
                })
            }
            // A concurrent run saved first.
            Err(StoreError::AlreadyExists { .. }) => {
                info!(brief_date = %today, "Brief saved by another run");
                Ok(BuildOutcome::AlreadyBuilt)
            }
            Err(e) => Err(BuildError::Persistence(e)),
        }
    }

    async fn program_section(
        &self,
        adapter: &dyn Adapter,
        now: DateTime<Utc>,
    ) -> Result<Option<brief_core::BriefSection>, BuildError> {
        let program = adapter.program();
        let today = now.date_naive();
        let since = now - Duration::hours(LOOKBACK_HOURS);
        let aggregation = |source: StoreError| BuildError::Aggregation {
            program: program.code.clone(),
            source,
        };

        let news = self
            .content
            .recent_news(Some(&program.code), since)
            .await
            .map_err(aggregation)?;

        let new_opportunities = self
            .fetch(adapter, SolicitationFilter::UpdatedSince(since))
            .await
            .map_err(aggregation)?;

        let closing_soon = self
            .fetch(
                adapter,
                SolicitationFilter::ClosingBetween {
                    from: today,
                    to: today + Duration::days(CLOSING_WINDOW_DAYS),
                },
            )
            .await
            .map_err(aggregation)?;

        if news.is_empty() && new_opportunities.is_empty() && closing_soon.is_empty() {
            return Ok(None);
        }

        let request = AnalysisRequest {
            program_code: &program.code,
            program_name: &program.name,
            keywords: &program.keywords,
            news: &news,
            new_opportunities: &new_opportunities,
            closing_soon: &closing_soon,
            today,
        };
        let narrative = self.narrative(&program, &request).await;

        Ok(render::render_section(&SectionParts {
            title: &program.name,
            program_code: Some(&program.code),
            news: ClassifiedNews::classify(&self.classifier, &news),
            new_opportunities: &new_opportunities,
            closing_soon: &closing_soon,
            narrative,
        }))
    }

    async fn fetch(
        &self,
        adapter: &dyn Adapter,
        filter: SolicitationFilter,
    ) -> Result<Vec<Solicitation>, StoreError> {
        let rows = adapter
            .fetch_solicitations(self.content.as_ref(), filter)
            .await?;
        Ok(rows.into_iter().map(|raw| adapter.normalize(raw)).collect())
    }

    // An analyzer failure drops the block, not the section.
    async fn narrative(
        &self,
        program: &Program,
        request: &AnalysisRequest<'_>,
    ) -> Vec<(InsightPrompt, String)> {
        let mut blocks = Vec::new();
        for prompt in [InsightPrompt::WhatThisMeans, InsightPrompt::NextActions] {
            match self.analyzer.analyze(request, prompt).await {
                Ok(text) => blocks.push((prompt, text)),
                Err(e) => warn!(
                    program = %program.code,
                    prompt = prompt.heading(),
                    error = %e,
                    "Analyzer failed, omitting block"
                ),
            }
        }
        blocks
    }

    async fn general_section(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<brief_core::BriefSection>, BuildError> {
        let since = now - Duration::hours(LOOKBACK_HOURS);
        let news = self
            .content
            .recent_news(None, since)
            .await
            .map_err(|source| BuildError::Aggregation {
                program: render::GENERAL_TAG.to_string(),
                source,
            })?;

        Ok(render::render_section(&SectionParts {
            title: render::GENERAL_TITLE,
            program_code: None,
            news: ClassifiedNews::classify(&self.classifier, &news),
            new_opportunities: &[],
            closing_soon: &[],
            narrative: Vec::new(),
        }))
    }
}
