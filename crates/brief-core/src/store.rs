//! Storage collaborator traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;
use crate::model::{BriefDocument, ContentItem, NewBrief, RawSolicitation, Subscriber};

/// Persistence façade for daily briefs.
///
/// Rows are append-only once saved; `mark_sent` is the only mutation.
#[async_trait]
pub trait BriefRepository: Send + Sync {
    /// Whether a brief already exists for the given day.
    async fn exists_for_day(&self, day: NaiveDate) -> Result<bool, StoreError>;

    /// Persist a new brief and return its id.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the day already has one.
    async fn save(&self, brief: &NewBrief) -> Result<i64, StoreError>;

    /// The brief for the given day, if it exists and has not been sent.
    async fn unsent_for_day(&self, day: NaiveDate) -> Result<Option<BriefDocument>, StoreError>;

    /// A brief by id, if it exists and has not been sent.
    async fn find_unsent(&self, id: i64) -> Result<Option<BriefDocument>, StoreError>;

    /// Record distribution. Calling twice with the same id is a no-op.
    async fn mark_sent(&self, id: i64, recipient_count: usize) -> Result<(), StoreError>;
}

/// Which solicitations to read for a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolicitationFilter {
    /// Created or updated at or after the instant.
    UpdatedSince(DateTime<Utc>),
    /// Closing on a day in the inclusive range.
    ClosingBetween { from: NaiveDate, to: NaiveDate },
}

/// Read access to the content and solicitation stores populated by fetch jobs.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// News published at or after `since`.
    ///
    /// `Some(code)` selects one program's items, `None` selects unattributed items.
    async fn recent_news(
        &self,
        program_code: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Raw solicitation rows for one program.
    async fn solicitations(
        &self,
        program_code: &str,
        filter: SolicitationFilter,
    ) -> Result<Vec<RawSolicitation>, StoreError>;
}

/// Read access to the mailing list.
#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// All active subscribers, in a stable order.
    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, StoreError>;
}
