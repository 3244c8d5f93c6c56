//! Shared wiring for the `build_brief` and `send_brief` batch jobs.
//!
//! Both binaries load `.env`, install logging, read [`JobsConfig`] and open
//! the SQLite database before doing their one unit of work.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use ai_analyzer::{AiAnalyzer, AiAnalyzerConfig};
use brief_core::{Analyzer, ClassifierRules, ReliabilityClassifier};
use database::Database;
use rule_analyzer::{FallbackAnalyzer, RuleAnalyzer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Database location used when `SQLITE_PATH` is unset.
pub const DEFAULT_SQLITE_PATH: &str = "data/briefs.db";

/// Environment configuration shared by both jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsConfig {
    /// Path to the SQLite file, or a full `sqlite:` URL.
    pub sqlite_path: String,
    /// Pause between outgoing messages.
    pub send_delay: Duration,
    /// Overrides the classifier's high-reliability source list when set.
    pub high_reliability_sources: Option<Vec<String>>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            send_delay: broadcaster::DEFAULT_SEND_DELAY,
            high_reliability_sources: None,
        }
    }
}

impl JobsConfig {
    /// Read `SQLITE_PATH`, `BRIEF_SEND_DELAY_MS` and `BRIEF_HIGH_RELIABILITY_SOURCES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let sqlite_path = lookup("SQLITE_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.sqlite_path);

        let send_delay = lookup("BRIEF_SEND_DELAY_MS")
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.send_delay);

        let high_reliability_sources = lookup("BRIEF_HIGH_RELIABILITY_SOURCES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        Self {
            sqlite_path,
            send_delay,
            high_reliability_sources,
        }
    }

    /// The sqlx connection URL for `sqlite_path`.
    pub fn database_url(&self) -> String {
        if self.sqlite_path.starts_with("sqlite:") {
            self.sqlite_path.clone()
        } else {
            format!("sqlite:{}", self.sqlite_path)
        }
    }

    /// The classifier with any configured source override applied.
    pub fn classifier(&self) -> ReliabilityClassifier {
        let rules = match &self.high_reliability_sources {
            Some(sources) => ClassifierRules::default().with_sources(sources.iter().cloned()),
            None => ClassifierRules::default(),
        };
        ReliabilityClassifier::new(rules)
    }
}

/// Load `.env` and install the fmt subscriber (`RUST_LOG`, default `info`).
pub fn init() {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Open the configured database and apply migrations.
pub async fn open_database(config: &JobsConfig) -> database::Result<Database> {
    let db = Database::connect(&config.database_url()).await?;
    db.migrate().await?;
    Ok(db)
}

/// The AI analyzer with rule fallback when an API key is configured, rules only otherwise.
pub fn select_analyzer() -> Arc<dyn Analyzer> {
    if !AiAnalyzerConfig::is_configured() {
        info!("BRIEF_AI_API_KEY not set, using rule-based analysis");
        return Arc::new(RuleAnalyzer::new());
    }

    match AiAnalyzer::from_env() {
        Ok(ai) => {
            info!(model = %ai.config().model, "Using AI analysis with rule fallback");
            Arc::new(FallbackAnalyzer::new(ai, RuleAnalyzer::new()))
        }
        Err(e) => {
            warn!(error = %e, "AI analyzer misconfigured, using rule-based analysis");
            Arc::new(RuleAnalyzer::new())
        }
    }
}

/// Append an activity-log row. Failures are logged and ignored.
pub async fn log_activity(db: &Database, action: &str, detail: &str) {
    if let Err(e) = database::activity::record(db.pool(), action, detail).await {
        warn!(action, error = %e, "Failed to write activity log");
    }
}
