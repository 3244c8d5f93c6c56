//! Solicitation rows written by the program adapters' fetch jobs.

use brief_core::RawSolicitation;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::SolicitationRow;

/// Insert or refresh a solicitation, keyed by program and opportunity number.
///
/// `seen_at` becomes `updated_at`, and `created_at` on first insert.
pub async fn upsert_solicitation(
    pool: &SqlitePool,
    solicitation: &RawSolicitation,
    seen_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO solicitations
            (opp_no, title, agency, status, close_date, url, program_code, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (program_code, opp_no) DO UPDATE SET
            title = excluded.title,
            agency = excluded.agency,
            status = excluded.status,
            close_date = excluded.close_date,
            url = excluded.url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&solicitation.opp_no)
    .bind(&solicitation.title)
    .bind(&solicitation.agency)
    .bind(&solicitation.status)
    .bind(solicitation.close_date)
    .bind(&solicitation.url)
    .bind(&solicitation.program_code)
    .bind(seen_at)
    .bind(seen_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Solicitations created or updated at or after `since`, most recent first.
pub async fn updated_since(
    pool: &SqlitePool,
    program_code: &str,
    since: DateTime<Utc>,
) -> Result<Vec<RawSolicitation>> {
    let rows = sqlx::query_as::<_, SolicitationRow>(
        r#"
        SELECT opp_no, title, agency, status, close_date, url, program_code
        FROM solicitations
        WHERE program_code = ?
          AND (julianday(created_at) >= julianday(?) OR julianday(updated_at) >= julianday(?))
        ORDER BY julianday(updated_at) DESC, id DESC
        "#,
    )
    .bind(program_code)
    .bind(since)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RawSolicitation::from).collect())
}

/// Solicitations closing on a day in `[from, to]`, soonest first.
pub async fn closing_between(
    pool: &SqlitePool,
    program_code: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<RawSolicitation>> {
    let rows = sqlx::query_as::<_, SolicitationRow>(
        r#"
        SELECT opp_no, title, agency, status, close_date, url, program_code
        FROM solicitations
        WHERE program_code = ?
          AND close_date IS NOT NULL
          AND close_date >= ? AND close_date <= ?
        ORDER BY close_date ASC, id ASC
        "#,
    )
    .bind(program_code)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RawSolicitation::from).collect())
}
