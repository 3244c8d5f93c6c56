//! Collaborator trait implementations backed by [`Database`].

use async_trait::async_trait;
use brief_core::{
    BriefDocument, BriefRepository, ContentItem, ContentStore, NewBrief, RawSolicitation,
    SolicitationFilter, StoreError, Subscriber, SubscriberDirectory,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{brief, news, solicitation, subscriber, Database};

#[async_trait]
impl BriefRepository for Database {
    async fn exists_for_day(&self, day: NaiveDate) -> Result<bool, StoreError> {
        Ok(brief::exists_for_day(self.pool(), day).await?)
    }

    async fn save(&self, new_brief: &NewBrief) -> Result<i64, StoreError> {
        let id = brief::insert_brief(self.pool(), new_brief).await?;
        tracing::info!(brief_id = id, brief_date = %new_brief.brief_date, "Saved brief");
        Ok(id)
    }

    async fn unsent_for_day(&self, day: NaiveDate) -> Result<Option<BriefDocument>, StoreError> {
        Ok(brief::get_unsent_for_day(self.pool(), day).await?)
    }

    async fn find_unsent(&self, id: i64) -> Result<Option<BriefDocument>, StoreError> {
        Ok(brief::get_unsent(self.pool(), id).await?)
    }

    async fn mark_sent(&self, id: i64, recipient_count: usize) -> Result<(), StoreError> {
        let count = i64::try_from(recipient_count).unwrap_or(i64::MAX);
        let updated = brief::mark_sent(self.pool(), id, count, Utc::now()).await?;
        if !updated {
            tracing::debug!(brief_id = id, "Brief already marked sent");
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for Database {
    async fn recent_news(
        &self,
        program_code: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let items = match program_code {
            Some(code) => news::recent_for_program(self.pool(), code, since).await?,
            None => news::recent_unattributed(self.pool(), since).await?,
        };
        Ok(items)
    }

    async fn solicitations(
        &self,
        program_code: &str,
        filter: SolicitationFilter,
    ) -> Result<Vec<RawSolicitation>, StoreError> {
        let rows = match filter {
            SolicitationFilter::UpdatedSince(since) => {
                solicitation::updated_since(self.pool(), program_code, since).await?
            }
            SolicitationFilter::ClosingBetween { from, to } => {
                solicitation::closing_between(self.pool(), program_code, from, to).await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl SubscriberDirectory for Database {
    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(subscriber::list_active(self.pool()).await?)
    }
}
