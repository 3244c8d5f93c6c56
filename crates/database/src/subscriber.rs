//! Subscriber operations.

use brief_core::Subscriber;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::SubscriberRow;

/// Add a subscriber and return its id.
pub async fn create_subscriber(pool: &SqlitePool, email: &str, name: Option<&str>) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO subscribers (email, name)
        VALUES (?, ?)
        "#,
    )
    .bind(email)
    .bind(name)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Subscriber",
                    id: email.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Activate or deactivate a subscriber.
pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE subscribers
        SET active = ?
        WHERE id = ?
        "#,
    )
    .bind(active)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Subscriber",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// All active subscribers in insertion order.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Subscriber>> {
    let rows = sqlx::query_as::<_, SubscriberRow>(
        r#"
        SELECT id, email, name, active
        FROM subscribers
        WHERE active = 1
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Subscriber::from).collect())
}
