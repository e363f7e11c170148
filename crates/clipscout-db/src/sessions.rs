//! Database operations for the `sessions` table.
//!
//! A user has at most one `active` session, enforced by a partial unique
//! index; starting a new session supersedes the previous one to `completed`
//! in the same transaction. Status changes are guarded so `completed` and
//! `cancelled` are terminal.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub public_id: Uuid,
    pub user_id: String,
    pub topic: String,
    pub status: String,
    pub current_step: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SESSION_COLUMNS: &str =
    "id, public_id, user_id, topic, status, current_step, created_at, updated_at";

/// Creates a new `active` session. Any existing active session for the
/// user is superseded to `completed` in the same transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction fails.
pub async fn create_session(
    pool: &PgPool,
    user_id: &str,
    topic: &str,
) -> Result<SessionRow, DbError> {
    let public_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE sessions \
         SET status = 'completed', updated_at = NOW() \
         WHERE user_id = $1 AND status = 'active'",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "INSERT INTO sessions (public_id, user_id, topic, status) \
         VALUES ($1, $2, $3, 'active') \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(public_id)
    .bind(user_id)
    .bind(topic)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Fetches the user's active session, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_session(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<SessionRow>, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions \
         WHERE user_id = $1 AND status = 'active'"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Fetches a session by its public UUID.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_session_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<SessionRow, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the user's most recent `limit` sessions, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sessions(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<SessionRow>, DbError> {
    let rows = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Records which pipeline step an active session is on.
///
/// # Errors
///
/// Returns [`DbError::InvalidSessionTransition`] if the session is not
/// active, or [`DbError::Sqlx`] if the update fails.
pub async fn update_session_step(pool: &PgPool, id: i64, step: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sessions \
         SET current_step = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'active'",
    )
    .bind(step)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSessionTransition {
            id,
            expected_status: "active",
        });
    }

    Ok(())
}

/// Moves an active session to a terminal status.
///
/// Only `active -> completed` and `active -> cancelled` exist; terminal
/// sessions never change status again.
///
/// # Errors
///
/// Returns [`DbError::InvalidSessionTransition`] if the session is not
/// active, or [`DbError::Sqlx`] if the update fails.
pub async fn update_session_status(pool: &PgPool, id: i64, status: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sessions \
         SET status = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'active' AND $1 IN ('completed', 'cancelled')",
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSessionTransition {
            id,
            expected_status: "active",
        });
    }

    Ok(())
}

/// Marks an active session `completed`.
///
/// # Errors
///
/// See [`update_session_status`].
pub async fn complete_session(pool: &PgPool, id: i64) -> Result<(), DbError> {
    update_session_status(pool, id, "completed").await
}

/// Marks an active session `cancelled`.
///
/// # Errors
///
/// See [`update_session_status`].
pub async fn cancel_session(pool: &PgPool, id: i64) -> Result<(), DbError> {
    update_session_status(pool, id, "cancelled").await
}
