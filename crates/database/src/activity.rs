//! Append-only activity log.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::ActivityEntry;

/// Action recorded after a brief is persisted.
pub const BRIEF_BUILT: &str = "brief_built";
/// Action recorded after a brief is distributed.
pub const BRIEF_SENT: &str = "brief_sent";

/// Append an entry.
pub async fn record(pool: &SqlitePool, action: &str, detail: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activity_log (action, detail)
        VALUES (?, ?)
        "#,
    )
    .bind(action)
    .bind(detail)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent entries first.
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityEntry>> {
    let entries = sqlx::query_as::<_, ActivityEntry>(
        r#"
        SELECT id, action, detail, created_at
        FROM activity_log
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
