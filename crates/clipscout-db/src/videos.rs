//! Database operations for the `videos` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `videos` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub session_id: i64,
    pub source_id: String,
    pub platform: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub duration_secs: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub engagement_score: f64,
    pub is_viral: bool,
    pub analysis: Option<serde_json::Value>,
    pub analysis_origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for one discovered (and possibly enriched) video.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub source_id: String,
    pub platform: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub duration_secs: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub engagement_score: f64,
    pub is_viral: bool,
    pub analysis: Option<serde_json::Value>,
    pub analysis_origin: Option<String>,
}

const VIDEO_COLUMNS: &str = "id, session_id, source_id, platform, title, description, url, \
     thumbnail_url, views, likes, comments, duration_secs, published_at, engagement_score, \
     is_viral, analysis, analysis_origin, created_at";

/// Upserts one video batch for a session.
///
/// Conflicts on `(session_id, source_id, platform)` refresh the metrics and
/// analysis in place, so re-running a stage never duplicates rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn upsert_session_videos(
    pool: &PgPool,
    session_id: i64,
    videos: &[NewVideo],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for video in videos {
        sqlx::query(
            "INSERT INTO videos \
                 (session_id, source_id, platform, title, description, url, thumbnail_url, \
                  views, likes, comments, duration_secs, published_at, engagement_score, \
                  is_viral, analysis, analysis_origin) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (session_id, source_id, platform) DO UPDATE SET \
                 title            = EXCLUDED.title, \
                 description      = EXCLUDED.description, \
                 url              = EXCLUDED.url, \
                 thumbnail_url    = EXCLUDED.thumbnail_url, \
                 views            = GREATEST(videos.views, EXCLUDED.views), \
                 likes            = GREATEST(videos.likes, EXCLUDED.likes), \
                 comments         = GREATEST(videos.comments, EXCLUDED.comments), \
                 duration_secs    = EXCLUDED.duration_secs, \
                 published_at     = EXCLUDED.published_at, \
                 engagement_score = EXCLUDED.engagement_score, \
                 is_viral         = EXCLUDED.is_viral, \
                 analysis         = COALESCE(EXCLUDED.analysis, videos.analysis), \
                 analysis_origin  = COALESCE(EXCLUDED.analysis_origin, videos.analysis_origin)",
        )
        .bind(session_id)
        .bind(&video.source_id)
        .bind(&video.platform)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.url)
        .bind(&video.thumbnail_url)
        .bind(video.views)
        .bind(video.likes)
        .bind(video.comments)
        .bind(video.duration_secs)
        .bind(video.published_at)
        .bind(video.engagement_score)
        .bind(video.is_viral)
        .bind(&video.analysis)
        .bind(&video.analysis_origin)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Returns a session's videos ordered by engagement score, best first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_session_videos(
    pool: &PgPool,
    session_id: i64,
    viral_only: bool,
    limit: i64,
) -> Result<Vec<VideoRow>, DbError> {
    let rows = sqlx::query_as::<_, VideoRow>(&format!(
        "SELECT {VIDEO_COLUMNS} FROM videos \
         WHERE session_id = $1 AND ($2 = false OR is_viral = true) \
         ORDER BY engagement_score DESC, views DESC, id ASC \
         LIMIT $3"
    ))
    .bind(session_id)
    .bind(viral_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
