//! Rule-based narrative: canned program insight plus a seasonal note.

use brief_core::{async_trait, AnalysisRequest, Analyzer, AnalyzerError, InsightPrompt};
use chrono::Datelike;

/// Closing-soon entries called out individually in "next actions".
const MAX_DEADLINES: usize = 3;
/// Keywords suggested for saved searches.
const MAX_KEYWORDS: usize = 3;

/// An analyzer that produces fixed text from the request alone.
///
/// Output depends only on the request, so it is stable for a given day.
#[derive(Debug, Clone, Default)]
pub struct RuleAnalyzer;

impl RuleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn what_this_means(request: &AnalysisRequest<'_>) -> String {
        let mut out = format!(
            "{}: {} news {}, {} new {}, {} closing within 7 days.",
            request.program_name,
            request.news.len(),
            plural(request.news.len(), "item", "items"),
            request.new_opportunities.len(),
            plural(request.new_opportunities.len(), "opportunity", "opportunities"),
            request.closing_soon.len(),
        );
        out.push_str("\n\n");
        out.push_str(&program_insight(request.program_code, request.program_name));
        out.push_str("\n\n");
        out.push_str(seasonal_insight(request.today.month()));
        out
    }

    fn next_actions(request: &AnalysisRequest<'_>) -> String {
        let mut actions = Vec::new();

        for solicitation in request.closing_soon.iter().take(MAX_DEADLINES) {
            let due = solicitation
                .close_date
                .map(|d| d.format("%b %-d").to_string())
                .unwrap_or_else(|| "soon".to_string());
            actions.push(format!(
                "Finalize the response to {} ({}) due {}",
                solicitation.opp_no, solicitation.title, due
            ));
        }
        if request.closing_soon.len() > MAX_DEADLINES {
            actions.push(format!(
                "Triage {} more deadlines this week",
                request.closing_soon.len() - MAX_DEADLINES
            ));
        }

        if !request.new_opportunities.is_empty() {
            actions.push(format!(
                "Run bid/no-bid on {} new {}",
                request.new_opportunities.len(),
                plural(request.new_opportunities.len(), "opportunity", "opportunities")
            ));
        }

        if !request.news.is_empty() {
            actions.push("Brief capture leads on today's news and verify anything unconfirmed".to_string());
        }

        if !request.keywords.is_empty() {
            let keywords: Vec<&str> = request
                .keywords
                .iter()
                .take(MAX_KEYWORDS)
                .map(String::as_str)
                .collect();
            actions.push(format!("Refresh saved searches for: {}", keywords.join(", ")));
        }

        if actions.is_empty() {
            actions.push(format!("No immediate actions; keep monitoring {}", request.program_name));
        }

        actions
            .iter()
            .map(|a| format!("- {}", a))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Analyzer for RuleAnalyzer {
    async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        prompt: InsightPrompt,
    ) -> Result<String, AnalyzerError> {
        Ok(match prompt {
            InsightPrompt::WhatThisMeans => Self::what_this_means(request),
            InsightPrompt::NextActions => Self::next_actions(request),
        })
    }

    fn name(&self) -> &str {
        "RuleAnalyzer"
    }
}

/// Canned insight for a program code.
pub fn program_insight(code: &str, name: &str) -> String {
    match code {
        "tls" => "TLS prime vendors compete on fulfilment speed. DLA order volume follows \
                  readiness funding, so watch for surges tied to operational requirements."
            .to_string(),
        "oasis" => "OASIS+ task orders are competed among on-ramped holders. Domain-specific \
                    pools reward teams that pre-position past performance before the RFP drops."
            .to_string(),
        "sewp" => "SEWP V ordering tracks agency IT refresh cycles. Price competition is tight, \
                   so quote speed and OEM authorization letters decide most awards."
            .to_string(),
        _ => format!(
            "Monitor {} for shifts in ordering patterns and recompete timing.",
            name
        ),
    }
}

/// Seasonal insight keyed by calendar month (1-12).
pub fn seasonal_insight(month: u32) -> &'static str {
    match month {
        6..=9 => "Seasonal: fiscal year-end surge. Agencies obligate expiring funds before \
                  September 30; expect compressed timelines and quick-turn task orders.",
        10..=12 => "Seasonal: new fiscal year. Continuing resolutions often block new starts; \
                    expect slower awards and more activity on existing vehicles.",
        _ => "Seasonal: steady-state planning. Agencies shape Q4 requirements now; use the \
              window for capture planning and customer engagement.",
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
