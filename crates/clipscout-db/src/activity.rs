//! Session activity log.
//!
//! Activity entries are observability, not state: a failed insert is logged
//! and swallowed so it can never fail the pipeline stage that produced it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `activity_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub session_id: i64,
    pub event: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends one activity entry, logging rather than propagating failures.
pub async fn append_activity(pool: &PgPool, session_id: i64, event: &str, detail: Option<&str>) {
    let result = sqlx::query(
        "INSERT INTO activity_log (session_id, event, detail) VALUES ($1, $2, $3)",
    )
    .bind(session_id)
    .bind(event)
    .bind(detail)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(session_id, event, error = %e, "failed to record activity");
    }
}

/// Returns a session's activity entries, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_activity(pool: &PgPool, session_id: i64) -> Result<Vec<ActivityRow>, DbError> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT id, session_id, event, detail, created_at \
         FROM activity_log \
         WHERE session_id = $1 \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
