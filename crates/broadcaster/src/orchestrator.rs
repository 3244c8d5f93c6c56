//! SendOrchestrator: delivers one brief to every active subscriber.

use std::sync::Arc;
use std::time::Duration;

use brief_core::{BriefDocument, BriefRepository, Mailer, SendResult, SubscriberDirectory};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::render;

/// Pause between consecutive messages.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(500);

/// Failure messages kept in a [`SendReport`].
pub const MAX_REPORTED_ERRORS: usize = 5;

/// Aggregate outcome of a send run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    /// The brief that was sent, `None` when there was nothing to send.
    pub brief_id: Option<i64>,
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    /// The first few failures, formatted as `"email: reason"`.
    pub errors: Vec<String>,
}

impl SendReport {
    fn empty(brief_id: Option<i64>) -> Self {
        Self {
            brief_id,
            ..Self::default()
        }
    }

    fn record(&mut self, result: SendResult) {
        self.total += 1;
        if result.success {
            self.sent += 1;
            return;
        }

        self.failed += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            let reason = result.error.as_deref().unwrap_or("unknown error");
            self.errors.push(format!("{}: {}", result.email, reason));
        }
    }
}

/// Sends unsent briefs, one recipient at a time.
pub struct SendOrchestrator {
    briefs: Arc<dyn BriefRepository>,
    subscribers: Arc<dyn SubscriberDirectory>,
    mailer: Arc<dyn Mailer>,
    delay: Duration,
}

impl SendOrchestrator {
    pub fn new(
        briefs: Arc<dyn BriefRepository>,
        subscribers: Arc<dyn SubscriberDirectory>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            briefs,
            subscribers,
            mailer,
            delay: DEFAULT_SEND_DELAY,
        }
    }

    /// Set the pause between messages. Zero disables it.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Send today's brief if it has not been sent yet.
    pub async fn send_pending(&self) -> Result<SendReport> {
        self.send_pending_on(Utc::now().date_naive()).await
    }

    /// Send the brief for `day` if it exists and has not been sent yet.
    pub async fn send_pending_on(&self, day: NaiveDate) -> Result<SendReport> {
        match self.briefs.unsent_for_day(day).await? {
            Some(brief) => self.distribute(brief).await,
            None => {
                info!(brief_date = %day, "No unsent brief for the day");
                Ok(SendReport::empty(None))
            }
        }
    }

    /// Send a specific brief. Unknown or already-sent briefs are a no-op.
    pub async fn send(&self, brief_id: i64) -> Result<SendReport> {
        match self.briefs.find_unsent(brief_id).await? {
            Some(brief) => self.distribute(brief).await,
            None => {
                info!(brief_id, "Brief not found or already sent");
                Ok(SendReport::empty(Some(brief_id)))
            }
        }
    }

    #[instrument(skip(self, brief), fields(brief_id = brief.id, mailer = self.mailer.name()))]
    async fn distribute(&self, brief: BriefDocument) -> Result<SendReport> {
        let subscribers = self.subscribers.active_subscribers().await?;
        let mut report = SendReport::empty(Some(brief.id));

        if subscribers.is_empty() {
            info!("No active subscribers, nothing to send");
            return Ok(report);
        }

        info!(recipients = subscribers.len(), "Sending brief");

        let last = subscribers.len() - 1;
        for (i, subscriber) in subscribers.iter().enumerate() {
            let name = subscriber.display_name();
            let text = render::personalize_text(&brief.content, name);
            let html = render::personalize_html(&brief.content, name, &brief.title);

            let result = match self
                .mailer
                .deliver(&subscriber.email, &brief.title, &html, &text)
                .await
            {
                Ok(()) => {
                    debug!(recipient = %subscriber.email, "Brief delivered");
                    SendResult::delivered(&subscriber.email)
                }
                Err(e) => {
                    warn!(recipient = %subscriber.email, error = %e, "Brief delivery failed");
                    SendResult::failed(&subscriber.email, e.to_string())
                }
            };
            report.record(result);

            if i < last && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.briefs.mark_sent(brief.id, report.sent).await?;

        info!(
            sent = report.sent,
            failed = report.failed,
            total = report.total,
            "Brief distribution complete"
        );
        Ok(report)
    }
}
