//! Row types and their conversion into the shared data model.

use brief_core::{
    BriefDocument, BriefSection, ContentItem, RawSolicitation, ReliabilityTier, Subscriber,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::error::Result;

/// A row of the `news` table.
#[derive(Debug, Clone, FromRow)]
pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub program_code: Option<String>,
    pub base_tier: Option<String>,
}

impl From<NewsRow> for ContentItem {
    fn from(row: NewsRow) -> Self {
        // Unknown tier strings are treated as unassigned.
        let base_tier = row.base_tier.as_deref().and_then(|t| {
            t.parse::<ReliabilityTier>()
                .map_err(|e| tracing::debug!(news_id = row.id, error = %e, "ignoring base tier"))
                .ok()
        });

        ContentItem {
            title: row.title,
            body: row.content,
            url: row.url,
            source: row.source,
            published_at: row.published_at,
            program_code: row.program_code,
            base_tier,
        }
    }
}

/// A row of the `solicitations` table.
#[derive(Debug, Clone, FromRow)]
pub struct SolicitationRow {
    pub opp_no: String,
    pub title: String,
    pub agency: Option<String>,
    pub status: Option<String>,
    pub close_date: Option<NaiveDate>,
    pub url: Option<String>,
    pub program_code: String,
}

impl From<SolicitationRow> for RawSolicitation {
    fn from(row: SolicitationRow) -> Self {
        RawSolicitation {
            opp_no: row.opp_no,
            title: row.title,
            agency: row.agency,
            status: row.status,
            close_date: row.close_date,
            url: row.url,
            program_code: row.program_code,
        }
    }
}

/// A row of the `subscribers` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriberRow {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub active: bool,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Subscriber {
            id: row.id,
            email: row.email,
            name: row.name,
            active: row.active,
        }
    }
}

/// A row of the `briefs` table. Sections and tags are JSON columns.
#[derive(Debug, Clone, FromRow)]
pub struct BriefRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub sections: String,
    pub tags: String,
    pub brief_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub recipient_count: i64,
}

impl BriefRow {
    /// Decode the JSON columns into a [`BriefDocument`].
    pub fn into_document(self) -> Result<BriefDocument> {
        let sections: Vec<BriefSection> = serde_json::from_str(&self.sections)?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;

        Ok(BriefDocument {
            id: self.id,
            title: self.title,
            content: self.content,
            sections,
            tags,
            brief_date: self.brief_date,
            created_at: self.created_at,
            sent_at: self.sent_at,
            recipient_count: self.recipient_count,
        })
    }
}

/// One entry of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ActivityEntry {
    pub id: i64,
    pub action: String,
    pub detail: String,
    pub created_at: String,
}
