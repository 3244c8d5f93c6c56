//! Data model shared across the brief pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Confidence classification assigned to a piece of ingested content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReliabilityTier {
    /// Official or otherwise verified information.
    Confirmed,
    /// Credible reporting that is still unfolding.
    Developing,
    /// Rumors, speculation and unverified chatter.
    Signal,
}

impl ReliabilityTier {
    /// Lowercase identifier used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReliabilityTier::Confirmed => "confirmed",
            ReliabilityTier::Developing => "developing",
            ReliabilityTier::Signal => "signal",
        }
    }

    /// Human-readable label used in rendered briefs.
    pub fn label(&self) -> &'static str {
        match self {
            ReliabilityTier::Confirmed => "Confirmed",
            ReliabilityTier::Developing => "Developing",
            ReliabilityTier::Signal => "Signal",
        }
    }
}

impl fmt::Display for ReliabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a stored tier string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reliability tier: {0}")]
pub struct ParseTierError(pub String);

impl FromStr for ReliabilityTier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(ReliabilityTier::Confirmed),
            "developing" => Ok(ReliabilityTier::Developing),
            "signal" => Ok(ReliabilityTier::Signal),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

/// A fetched news item. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub body: String,
    pub url: String,
    /// Name of the publishing source (feed title, outlet, agency).
    pub source: String,
    pub published_at: DateTime<Utc>,
    /// Program this item was attributed to, if any.
    pub program_code: Option<String>,
    /// Tier assigned by the feed configuration, if any.
    pub base_tier: Option<ReliabilityTier>,
}

impl ContentItem {
    /// Create an unattributed item with no feed-assigned tier.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
            source: source.into(),
            published_at,
            program_code: None,
            base_tier: None,
        }
    }

    /// Attribute the item to a program.
    pub fn with_program(mut self, code: impl Into<String>) -> Self {
        self.program_code = Some(code.into());
        self
    }

    /// Set the feed-assigned base tier.
    pub fn with_base_tier(mut self, tier: ReliabilityTier) -> Self {
        self.base_tier = Some(tier);
        self
    }
}

/// A solicitation row as stored by the fetch jobs, before adapter normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSolicitation {
    pub opp_no: String,
    pub title: String,
    pub agency: Option<String>,
    pub status: Option<String>,
    pub close_date: Option<NaiveDate>,
    pub url: Option<String>,
    pub program_code: String,
}

/// A normalized solicitation ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solicitation {
    pub opp_no: String,
    pub title: String,
    pub agency: String,
    pub status: String,
    pub close_date: Option<NaiveDate>,
    pub url: String,
    pub program_code: String,
}

/// A supported contract vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub code: String,
    pub name: String,
    pub keywords: Vec<String>,
}

/// One rendered section of a brief, embedded read-only into a [`BriefDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefSection {
    /// Program code, `None` for the general section.
    pub program_code: Option<String>,
    pub title: String,
    /// Rendered Markdown for the whole section.
    pub content: String,
    pub tags: Vec<String>,
    /// News + new-opportunity + closing-soon entries rendered into `content`.
    pub item_count: usize,
    /// Rendered "signals & rumors" sub-list (empty when there are none).
    pub signals: String,
}

/// A brief that has been composed but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrief {
    pub title: String,
    pub content: String,
    pub sections: Vec<BriefSection>,
    pub tags: Vec<String>,
    /// Calendar day the brief covers. At most one brief exists per day.
    pub brief_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl NewBrief {
    /// Total items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.item_count).sum()
    }
}

/// A persisted daily brief.
///
/// Immutable except for `sent_at` and `recipient_count`, which transition
/// exactly once from unset to set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefDocument {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub sections: Vec<BriefSection>,
    pub tags: Vec<String>,
    pub brief_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub recipient_count: i64,
}

impl BriefDocument {
    /// Whether the brief has already been distributed.
    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

/// A mailing-list member. Read-only to this pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub active: bool,
}

impl Subscriber {
    /// Name used in the greeting: the stored name, or the address local part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Outcome of one delivery attempt. Never persisted individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub email: String,
    pub success: bool,
    pub error: Option<String>,
}

impl SendResult {
    /// A successful delivery.
    pub fn delivered(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            success: true,
            error: None,
        }
    }

    /// A failed delivery with a reason.
    pub fn failed(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip_through_str() {
        for tier in [
            ReliabilityTier::Confirmed,
            ReliabilityTier::Developing,
            ReliabilityTier::Signal,
        ] {
            assert_eq!(tier.as_str().parse::<ReliabilityTier>().unwrap(), tier);
        }
        assert_eq!(" SIGNAL ".parse::<ReliabilityTier>().unwrap(), ReliabilityTier::Signal);
        assert!("verified".parse::<ReliabilityTier>().is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let mut subscriber = Subscriber {
            id: 1,
            email: "jane.doe@agency.gov".to_string(),
            name: Some("Jane".to_string()),
            active: true,
        };
        assert_eq!(subscriber.display_name(), "Jane");

        subscriber.name = Some("   ".to_string());
        assert_eq!(subscriber.display_name(), "jane.doe");

        subscriber.name = None;
        assert_eq!(subscriber.display_name(), "jane.doe");
    }

    #[test]
    fn test_new_brief_item_count() {
        let section = |count| BriefSection {
            program_code: None,
            title: "General".to_string(),
            content: String::new(),
            tags: vec![],
            item_count: count,
            signals: String::new(),
        };
        let brief = NewBrief {
            title: "Brief".to_string(),
            content: String::new(),
            sections: vec![section(3), section(2)],
            tags: vec![],
            brief_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            created_at: Utc::now(),
        };
        assert_eq!(brief.item_count(), 5);
    }
}
