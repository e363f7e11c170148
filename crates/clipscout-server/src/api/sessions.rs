//! Read endpoints over sessions and their collected artifacts.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct SessionItem {
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    pub status: String,
    pub current_step: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<clipscout_db::SessionRow> for SessionItem {
    fn from(row: clipscout_db::SessionRow) -> Self {
        Self {
            id: row.public_id,
            user_id: row.user_id,
            topic: row.topic,
            status: row.status,
            current_step: row.current_step,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct VideoItem {
    pub source_id: String,
    pub platform: String,
    pub title: String,
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

impl From<clipscout_db::VideoRow> for VideoItem {
    fn from(row: clipscout_db::VideoRow) -> Self {
        Self {
            source_id: row.source_id,
            platform: row.platform,
            title: row.title,
            url: row.url,
            thumbnail_url: row.thumbnail_url,
            views: row.views,
            likes: row.likes,
            comments: row.comments,
            duration_secs: row.duration_secs,
            published_at: row.published_at,
            engagement_score: row.engagement_score,
            is_viral: row.is_viral,
            analysis: row.analysis,
            analysis_origin: row.analysis_origin,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ScriptItem {
    pub version: i32,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ActivityItem {
    pub event: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserQuery {
    user_id: String,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VideosQuery {
    #[serde(default)]
    viral: bool,
    limit: Option<i64>,
}

pub(super) async fn list_sessions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = clipscout_db::list_sessions(
        &state.pool,
        &query.user_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items: Vec<SessionItem> = rows.into_iter().map(SessionItem::from).collect();
    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_active_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let row = clipscout_db::get_active_session(&state.pool, &query.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "not_found", "no active session for user")
        })?;

    Ok(Json(ApiResponse {
        data: SessionItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_session_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<VideosQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = clipscout_db::get_session_by_public_id(&state.pool, session_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let rows = clipscout_db::get_session_videos(
        &state.pool,
        session.id,
        query.viral,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items: Vec<VideoItem> = rows.into_iter().map(VideoItem::from).collect();
    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_latest_script(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = clipscout_db::get_session_by_public_id(&state.pool, session_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let script = clipscout_db::get_latest_script(&state.pool, session.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ScriptItem {
            version: script.version,
            content: script.content,
            status: script.status,
            created_at: script.created_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_session_activity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = clipscout_db::get_session_by_public_id(&state.pool, session_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let rows = clipscout_db::list_activity(&state.pool, session.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items: Vec<ActivityItem> = rows
        .into_iter()
        .map(|row| ActivityItem {
            event: row.event,
            detail: row.detail,
            created_at: row.created_at,
        })
        .collect();
    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}
