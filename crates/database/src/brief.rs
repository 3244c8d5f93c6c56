//! Brief persistence.

use brief_core::{BriefDocument, NewBrief};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::BriefRow;

const BRIEF_COLUMNS: &str =
    "id, title, content, sections, tags, brief_date, created_at, sent_at, recipient_count";

/// Whether a brief exists for the given day, sent or not.
pub async fn exists_for_day(pool: &SqlitePool, day: NaiveDate) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM briefs
        WHERE brief_date = ?
        "#,
    )
    .bind(day)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a brief and return its id.
///
/// The unique `brief_date` index turns a second insert for the same day into
/// [`DatabaseError::AlreadyExists`].
pub async fn insert_brief(pool: &SqlitePool, brief: &NewBrief) -> Result<i64> {
    let sections = serde_json::to_string(&brief.sections)?;
    let tags = serde_json::to_string(&brief.tags)?;

    let result = sqlx::query(
        r#"
        INSERT INTO briefs (title, content, sections, tags, brief_date, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&brief.title)
    .bind(&brief.content)
    .bind(&sections)
    .bind(&tags)
    .bind(brief.brief_date)
    .bind(brief.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Brief",
                    id: brief.brief_date.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Get a brief by id.
pub async fn get_brief(pool: &SqlitePool, id: i64) -> Result<BriefDocument> {
    let row = sqlx::query_as::<_, BriefRow>(&format!(
        "SELECT {BRIEF_COLUMNS} FROM briefs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Brief",
        id: id.to_string(),
    })?;

    row.into_document()
}

/// The unsent brief for a day, if any.
pub async fn get_unsent_for_day(pool: &SqlitePool, day: NaiveDate) -> Result<Option<BriefDocument>> {
    let row = sqlx::query_as::<_, BriefRow>(&format!(
        "SELECT {BRIEF_COLUMNS} FROM briefs WHERE brief_date = ? AND sent_at IS NULL"
    ))
    .bind(day)
    .fetch_optional(pool)
    .await?;

    row.map(BriefRow::into_document).transpose()
}

/// A brief by id, only if it has not been sent.
pub async fn get_unsent(pool: &SqlitePool, id: i64) -> Result<Option<BriefDocument>> {
    let row = sqlx::query_as::<_, BriefRow>(&format!(
        "SELECT {BRIEF_COLUMNS} FROM briefs WHERE id = ? AND sent_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(BriefRow::into_document).transpose()
}

/// Record distribution of a brief.
///
/// Returns `true` when this call performed the transition and `false` when the
/// brief had already been marked sent. A missing id is `NotFound`.
pub async fn mark_sent(
    pool: &SqlitePool,
    id: i64,
    recipient_count: i64,
    sent_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE briefs
        SET sent_at = ?, recipient_count = ?
        WHERE id = ? AND sent_at IS NULL
        "#,
    )
    .bind(sent_at)
    .bind(recipient_count)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    // Distinguish "already sent" from "no such brief".
    get_brief(pool, id).await?;
    Ok(false)
}

/// List briefs, newest day first.
pub async fn list_briefs(pool: &SqlitePool, limit: i64) -> Result<Vec<BriefDocument>> {
    let rows = sqlx::query_as::<_, BriefRow>(&format!(
        "SELECT {BRIEF_COLUMNS} FROM briefs ORDER BY brief_date DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(BriefRow::into_document).collect()
}
