//! News items written by the fetch jobs.

use brief_core::ContentItem;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::NewsRow;

/// Insert a news item and return its id.
pub async fn insert_news(pool: &SqlitePool, item: &ContentItem) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO news (title, content, url, source, published_at, program_code, base_tier)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.title)
    .bind(&item.body)
    .bind(&item.url)
    .bind(&item.source)
    .bind(item.published_at)
    .bind(&item.program_code)
    .bind(item.base_tier.map(|t| t.as_str()))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// News for one program published at or after `since`, newest first.
pub async fn recent_for_program(
    pool: &SqlitePool,
    program_code: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ContentItem>> {
    let rows = sqlx::query_as::<_, NewsRow>(
        r#"
        SELECT id, title, content, url, source, published_at, program_code, base_tier
        FROM news
        WHERE program_code = ? AND julianday(published_at) >= julianday(?)
        ORDER BY julianday(published_at) DESC, id DESC
        "#,
    )
    .bind(program_code)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ContentItem::from).collect())
}

/// Unattributed news published at or after `since`, newest first.
pub async fn recent_unattributed(
    pool: &SqlitePool,
    since: DateTime<Utc>,
) -> Result<Vec<ContentItem>> {
    let rows = sqlx::query_as::<_, NewsRow>(
        r#"
        SELECT id, title, content, url, source, published_at, program_code, base_tier
        FROM news
        WHERE (program_code IS NULL OR program_code = '')
          AND julianday(published_at) >= julianday(?)
        ORDER BY julianday(published_at) DESC, id DESC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ContentItem::from).collect())
}
