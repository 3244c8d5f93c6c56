//! Reliability classification of fetched content.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Source matches a high-reliability source ⇒ [`ReliabilityTier::Confirmed`]
//! 2. Title/body has an official-announcement keyword ⇒ `Confirmed`, demoted
//!    to [`ReliabilityTier::Developing`] when the feed's base tier is `Signal`
//! 3. Title/body has a speculative keyword ⇒ [`ReliabilityTier::Signal`]
//! 4. Otherwise the feed's base tier, or `Developing` when none was assigned
//!
//! Overlaps between the keyword lists are resolved by this order only.

use crate::model::{ContentItem, ReliabilityTier};

/// Sources whose reporting is treated as confirmed regardless of wording.
pub const DEFAULT_HIGH_RELIABILITY_SOURCES: &[&str] = &[
    "sam.gov",
    "gsa.gov",
    "federal register",
    "defense.gov",
    "dla.mil",
    "nasa.gov",
    "fpds",
];

/// Keywords that mark an official announcement.
pub const CONFIRMED_KEYWORDS: &[&str] = &[
    "announces",
    "awards",
    "official",
    "confirmed",
    "press release",
];

/// Keywords that mark speculative reporting.
pub const SIGNAL_KEYWORDS: &[&str] = &[
    "rumor",
    "allegedly",
    "sources say",
    "may",
    "pending",
    "preliminary award",
];

/// The rule set a [`ReliabilityClassifier`] evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRules {
    pub high_reliability_sources: Vec<String>,
    pub confirmed_keywords: Vec<String>,
    pub signal_keywords: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            high_reliability_sources: to_owned(DEFAULT_HIGH_RELIABILITY_SOURCES),
            confirmed_keywords: to_owned(CONFIRMED_KEYWORDS),
            signal_keywords: to_owned(SIGNAL_KEYWORDS),
        }
    }
}

impl ClassifierRules {
    /// Replace the high-reliability source list.
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.high_reliability_sources = sources.into_iter().map(Into::into).collect();
        self
    }
}

/// Assigns a [`ReliabilityTier`] to a [`ContentItem`].
///
/// Classification is total and side-effect free.
#[derive(Debug, Clone)]
pub struct ReliabilityClassifier {
    sources: Vec<String>,
    confirmed: Vec<String>,
    signal: Vec<String>,
}

impl Default for ReliabilityClassifier {
    fn default() -> Self {
        Self::new(ClassifierRules::default())
    }
}

impl ReliabilityClassifier {
    /// Create a classifier from a rule set. Matching is case-insensitive.
    pub fn new(rules: ClassifierRules) -> Self {
        Self {
            sources: normalize(rules.high_reliability_sources),
            confirmed: normalize(rules.confirmed_keywords),
            signal: normalize(rules.signal_keywords),
        }
    }

    /// Classify a single item.
    pub fn classify(&self, item: &ContentItem) -> ReliabilityTier {
        let source = item.source.to_lowercase();
        if self.sources.iter().any(|s| source.contains(s.as_str())) {
            return ReliabilityTier::Confirmed;
        }

        let text = format!("{} {}", item.title, item.body).to_lowercase();

        if contains_any(&text, &self.confirmed) {
            return match item.base_tier {
                Some(ReliabilityTier::Signal) => ReliabilityTier::Developing,
                _ => ReliabilityTier::Confirmed,
            };
        }

        if contains_any(&text, &self.signal) {
            return ReliabilityTier::Signal;
        }

        item.base_tier.unwrap_or(ReliabilityTier::Developing)
    }
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| text.contains(needle.as_str()))
}

// Empty entries would match every input.
fn normalize(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn to_owned(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}
