//! Pipeline run endpoint.
//!
//! Starting a run is fire-and-forget: the pipeline takes minutes (rate-
//! limited enrichment), so the handler validates input, spawns the run, and
//! answers 202. Progress is observable through the session endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use clipscout_pipeline::{run_pipeline, PipelineDeps};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct StartRunBody {
    user_id: String,
    topic: String,
}

#[derive(Debug, Serialize)]
pub(super) struct StartRunData {
    status: &'static str,
    user_id: String,
    topic: String,
}

pub(super) async fn start_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<StartRunBody>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = body.user_id.trim().to_string();
    let topic = body.topic.trim().to_string();
    if user_id.is_empty() || topic.is_empty() {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "user_id and topic must not be empty",
        ));
    }

    let deps = PipelineDeps {
        pool: state.pool.clone(),
        config: (*state.config).clone(),
        locks: state.locks,
    };
    {
        let user_id = user_id.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            if let Err(e) = run_pipeline(&deps, &user_id, &topic).await {
                tracing::warn!(user_id, topic, error = %e, "pipeline run failed");
            }
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: StartRunData {
                status: "accepted",
                user_id,
                topic,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
