//! Database operations for the `scripts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `scripts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScriptRow {
    pub id: i64,
    pub session_id: i64,
    pub version: i32,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

const SCRIPT_COLUMNS: &str = "id, session_id, version, content, status, created_at";

/// Saves a script draft with the next version number for the session.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn save_script(
    pool: &PgPool,
    session_id: i64,
    content: &str,
    status: &str,
) -> Result<ScriptRow, DbError> {
    let row = sqlx::query_as::<_, ScriptRow>(&format!(
        "INSERT INTO scripts (session_id, version, content, status) \
         VALUES ($1, \
                 (SELECT COALESCE(MAX(version), 0) + 1 FROM scripts WHERE session_id = $1), \
                 $2, $3) \
         RETURNING {SCRIPT_COLUMNS}"
    ))
    .bind(session_id)
    .bind(content)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches the highest-versioned script for a session.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the session has no scripts, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_script(pool: &PgPool, session_id: i64) -> Result<ScriptRow, DbError> {
    let row = sqlx::query_as::<_, ScriptRow>(&format!(
        "SELECT {SCRIPT_COLUMNS} FROM scripts \
         WHERE session_id = $1 \
         ORDER BY version DESC \
         LIMIT 1"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns every script version for a session, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scripts(pool: &PgPool, session_id: i64) -> Result<Vec<ScriptRow>, DbError> {
    let rows = sqlx::query_as::<_, ScriptRow>(&format!(
        "SELECT {SCRIPT_COLUMNS} FROM scripts \
         WHERE session_id = $1 \
         ORDER BY version DESC"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
