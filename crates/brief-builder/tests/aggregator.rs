//! BriefAggregator against in-memory stores and SQLite.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use brief_builder::{BriefAggregator, BuildError, BuildOutcome, ProgramRegistry};
use brief_core::{
    async_trait, AnalysisRequest, Analyzer, AnalyzerError, BriefDocument, BriefRepository,
    ContentItem, ContentStore, InsightPrompt, NewBrief, RawSolicitation, ReliabilityClassifier,
    SolicitationFilter, StoreError,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use database::{news, solicitation, Database};
use rule_analyzer::RuleAnalyzer;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap()
}

fn raw(code: &str, opp_no: &str, close: Option<NaiveDate>) -> RawSolicitation {
    RawSolicitation {
        opp_no: opp_no.to_string(),
        title: format!("Requirement {}", opp_no),
        agency: None,
        status: Some("open".to_string()),
        close_date: close,
        url: None,
        program_code: code.to_string(),
    }
}

#[derive(Default)]
struct FakeContent {
    news: Vec<ContentItem>,
    updated: HashMap<String, Vec<RawSolicitation>>,
    closing: HashMap<String, Vec<RawSolicitation>>,
    failing: HashSet<String>,
}

#[async_trait]
impl ContentStore for FakeContent {
    async fn recent_news(
        &self,
        program_code: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError> {
        if let Some(code) = program_code {
            if self.failing.contains(code) {
                return Err(StoreError::Persistence(format!("{} feed unavailable", code)));
            }
        }
        Ok(self
            .news
            .iter()
            .filter(|i| i.program_code.as_deref() == program_code && i.published_at >= since)
            .cloned()
            .collect())
    }

    async fn solicitations(
        &self,
        program_code: &str,
        filter: SolicitationFilter,
    ) -> Result<Vec<RawSolicitation>, StoreError> {
        let source = match filter {
            SolicitationFilter::UpdatedSince(_) => &self.updated,
            SolicitationFilter::ClosingBetween { .. } => &self.closing,
        };
        Ok(source.get(program_code).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct FakeBriefs {
    saved: Mutex<Vec<NewBrief>>,
    unavailable: bool,
}

#[async_trait]
impl BriefRepository for FakeBriefs {
    async fn exists_for_day(&self, day: NaiveDate) -> Result<bool, StoreError> {
        if self.unavailable {
            return Err(StoreError::Persistence("database is locked".to_string()));
        }
        Ok(self.saved.lock().unwrap().iter().any(|b| b.brief_date == day))
    }

    async fn save(&self, brief: &NewBrief) -> Result<i64, StoreError> {
        let mut saved = self.saved.lock().unwrap();
        if saved.iter().any(|b| b.brief_date == brief.brief_date) {
            return Err(StoreError::AlreadyExists {
                entity: "Brief",
                id: brief.brief_date.to_string(),
            });
        }
        saved.push(brief.clone());
        Ok(saved.len() as i64)
    }

    async fn unsent_for_day(&self, _day: NaiveDate) -> Result<Option<BriefDocument>, StoreError> {
        Ok(None)
    }

    async fn find_unsent(&self, _id: i64) -> Result<Option<BriefDocument>, StoreError> {
        Ok(None)
    }

    async fn mark_sent(&self, _id: i64, _recipient_count: usize) -> Result<(), StoreError> {
        Ok(())
    }
}

struct CannedAnalyzer;

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
        prompt: InsightPrompt,
    ) -> Result<String, AnalyzerError> {
        Ok(format!("{} insight for {}", prompt.heading(), request.program_code))
    }

    fn name(&self) -> &str {
        "CannedAnalyzer"
    }
}

fn aggregator(content: Arc<FakeContent>, briefs: Arc<FakeBriefs>) -> BriefAggregator {
    BriefAggregator::new(
        ProgramRegistry::standard(),
        ReliabilityClassifier::default(),
        content,
        briefs,
        Arc::new(CannedAnalyzer),
    )
}

fn tls_scenario() -> FakeContent {
    let mut content = FakeContent::default();
    content.news.push(
        ContentItem::new(
            "DLA announces TLS fire and emergency award",
            "",
            "https://news.example/tls",
            "Trade Weekly",
            now() - Duration::hours(2),
        )
        .with_program("tls"),
    );
    content.updated.insert(
        "tls".to_string(),
        vec![raw("tls", "spe8e5-26-r-0001", None), raw("tls", "spe8e5-26-r-0002", None)],
    );
    content
}

#[tokio::test]
async fn test_tls_section_counts_rendered_entries() {
    let briefs = Arc::new(FakeBriefs::default());
    let outcome = aggregator(Arc::new(tls_scenario()), briefs.clone())
        .build_at(now())
        .await
        .unwrap();

    assert!(matches!(outcome, BuildOutcome::Built { sections: 1, item_count: 3, .. }));

    let saved = briefs.saved.lock().unwrap();
    let section = &saved[0].sections[0];
    assert_eq!(section.program_code.as_deref(), Some("tls"));
    assert_eq!(section.item_count, 3);

    let confirmed = section.content.split("### Confirmed").nth(1).unwrap();
    let confirmed = confirmed.split("###").next().unwrap();
    assert_eq!(confirmed.lines().filter(|l| l.starts_with("- ")).count(), 1);

    let new = section.content.split("### New Opportunities").nth(1).unwrap();
    let new = new.split("###").next().unwrap();
    assert_eq!(new.lines().filter(|l| l.starts_with("- ")).count(), 2);
    assert!(new.contains("SPE8E5-26-R-0001"));
    assert!(new.contains("Defense Logistics Agency"));

    assert!(!section.content.contains("### Closing Soon"));
    assert!(section.content.contains("### What This Means\n\nWhat This Means insight for tls"));
    assert!(section.content.contains("### Next Actions\n\nNext Actions insight for tls"));
    assert_eq!(saved[0].tags, vec!["tls".to_string()]);
}

#[tokio::test]
async fn test_second_build_same_day_is_noop() {
    let content = Arc::new(tls_scenario());
    let briefs = Arc::new(FakeBriefs::default());
    let aggregator = aggregator(content, briefs.clone());

    assert!(matches!(aggregator.build_at(now()).await.unwrap(), BuildOutcome::Built { .. }));
    assert_eq!(
        aggregator.build_at(now() + Duration::hours(3)).await.unwrap(),
        BuildOutcome::AlreadyBuilt
    );
    assert_eq!(briefs.saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failing_program_is_skipped() {
    let mut content = tls_scenario();
    content.failing.insert("tls".to_string());
    content.closing.insert(
        "sewp".to_string(),
        vec![raw("sewp", "NNG26-001", NaiveDate::from_ymd_opt(2026, 10, 19))],
    );
    let briefs = Arc::new(FakeBriefs::default());

    let outcome = aggregator(Arc::new(content), briefs.clone())
        .build_at(now())
        .await
        .unwrap();
    assert!(matches!(outcome, BuildOutcome::Built { sections: 1, .. }));

    let saved = briefs.saved.lock().unwrap();
    assert_eq!(saved[0].sections[0].program_code.as_deref(), Some("sewp"));
    assert!(saved[0].sections[0].content.contains("### Closing Soon"));
}

#[tokio::test]
async fn test_general_section_and_signals() {
    let mut content = FakeContent::default();
    content.news.push(ContentItem::new(
        "Sources say shutdown may delay contract starts",
        "",
        "https://news.example/general",
        "Contractor Forum",
        now() - Duration::hours(1),
    ));
    content.news.push(ContentItem::new(
        "Old news",
        "",
        "https://news.example/old",
        "Trade Weekly",
        now() - Duration::hours(30),
    ));
    let briefs = Arc::new(FakeBriefs::default());

    aggregator(Arc::new(content), briefs.clone())
        .build_at(now())
        .await
        .unwrap();

    let saved = briefs.saved.lock().unwrap();
    let brief = &saved[0];
    assert_eq!(brief.sections.len(), 1);
    let general = &brief.sections[0];
    assert!(general.program_code.is_none());
    assert_eq!(general.item_count, 1);
    assert!(general.signals.starts_with("- (Unverified) [Sources say shutdown"));
    assert!(!general.content.contains("What This Means"));
    assert_eq!(brief.tags, vec!["general".to_string()]);
    assert!(brief.content.contains("Good morning, {{name}}."));
    assert!(brief.content.contains("**How to read this brief**"));
}

#[tokio::test]
async fn test_empty_day_saves_nothing() {
    let briefs = Arc::new(FakeBriefs::default());
    let outcome = aggregator(Arc::new(FakeContent::default()), briefs.clone())
        .build_at(now())
        .await
        .unwrap();
    assert_eq!(outcome, BuildOutcome::NothingToReport);
    assert!(briefs.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repository_failure_is_fatal() {
    let briefs = Arc::new(FakeBriefs {
        unavailable: true,
        ..Default::default()
    });
    let result = aggregator(Arc::new(tls_scenario()), briefs).build_at(now()).await;
    assert!(matches!(result, Err(BuildError::Persistence(_))));
}

#[tokio::test]
async fn test_build_against_sqlite() {
    let db = Arc::new(Database::in_memory().await.unwrap());
    let at = Utc::now();

    news::insert_news(
        db.pool(),
        &ContentItem::new("GSA awards OASIS+ task order", "", "https://gsa.gov/1", "GSA.gov", at)
            .with_program("oasis"),
    )
    .await
    .unwrap();
    solicitation::upsert_solicitation(
        db.pool(),
        &raw("oasis", "47QRCA-26-0001", Some(at.date_naive() + Duration::days(2))),
        at,
    )
    .await
    .unwrap();

    let aggregator = BriefAggregator::new(
        ProgramRegistry::standard(),
        ReliabilityClassifier::default(),
        db.clone(),
        db.clone(),
        Arc::new(RuleAnalyzer::new()),
    );

    let first = aggregator.build_at(at).await.unwrap();
    let BuildOutcome::Built { id, item_count, .. } = first else {
        panic!("expected a new brief, got {:?}", first);
    };
    // Updated today and closing within the week: listed in both groups.
    assert_eq!(item_count, 3);

    assert_eq!(aggregator.build_at(at).await.unwrap(), BuildOutcome::AlreadyBuilt);

    let stored = db.unsent_for_day(at.date_naive()).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.tags, vec!["oasis".to_string()]);
    assert!(stored.content.contains("### Next Actions"));
}
