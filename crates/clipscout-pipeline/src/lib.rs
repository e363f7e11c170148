//! End-to-end session pipeline: discover, rank, enrich, synthesize, draft.
//!
//! One run per user at a time; a second run for the same user waits on the
//! per-user lock and then supersedes the prior session to `completed`.
//! Every stage records its step on the session row so observers can follow
//! along.

pub mod locks;
pub mod preview;

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use clipscout_analysis::{
    enrich_all, generate_script, rank, select_top, synthesize_insights, EnrichError,
    EnrichOptions, EnrichedItem, GenerationClient, GenerationConfig, GenerationError, InsightSet,
    RankedItem, ScriptStatus,
};
use clipscout_core::{AppConfig, Platform};
use clipscout_db::{DbError, NewVideo};
use clipscout_sources::{
    build_platform_chains, discover, PlatformOutcome, SearchQuery, SourceError,
};

pub use locks::SessionLocks;
pub use preview::{run_preview, PreviewResult};

pub const STEP_DISCOVERING: &str = "discovering";
pub const STEP_ANALYZING: &str = "analyzing";
pub const STEP_GENERATING: &str = "generating";
pub const STEP_DISCOVERY_FAILED: &str = "discovery-failed";
pub const STEP_ANALYSIS_FAILED: &str = "analysis-failed";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("discovery found no videos: {detail}")]
    Discovery { detail: String },

    #[error("no analyzer configured for enrichment")]
    AnalyzerUnavailable,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<EnrichError> for PipelineError {
    fn from(e: EnrichError) -> Self {
        match e {
            EnrichError::AnalyzerUnavailable => PipelineError::AnalyzerUnavailable,
        }
    }
}

/// Everything a pipeline run needs.
pub struct PipelineDeps {
    pub pool: PgPool,
    pub config: AppConfig,
    /// Shared across all runs so per-user serialization holds process-wide.
    pub locks: Arc<SessionLocks>,
}

/// Outcome of one full run.
#[derive(Debug)]
pub struct PipelineResult {
    pub session_public_id: Uuid,
    pub topic: String,
    pub platform_statuses: BTreeMap<Platform, PlatformOutcome>,
    pub items: Vec<EnrichedItem>,
    pub insights: InsightSet,
    pub script: String,
    pub script_status: ScriptStatus,
}

/// Runs the whole pipeline for one user and topic.
///
/// A failed run is a completed session, not a dangling one: the session
/// finishes with step `discovery-failed` or `analysis-failed` and the error
/// is returned. Only an explicit user cancellation marks a session
/// `cancelled`.
///
/// # Errors
///
/// Returns [`PipelineError`] when discovery comes back empty, the analyzer
/// has no credentials, or a database operation fails.
pub async fn run_pipeline(
    deps: &PipelineDeps,
    user_id: &str,
    topic: &str,
) -> Result<PipelineResult, PipelineError> {
    let _guard = deps.locks.acquire(user_id).await;

    let session = clipscout_db::create_session(&deps.pool, user_id, topic).await?;
    tracing::info!(
        session = %session.public_id,
        user_id,
        topic,
        "session started"
    );
    clipscout_db::append_activity(&deps.pool, session.id, "session_started", Some(topic)).await;

    // Discovery
    clipscout_db::update_session_step(&deps.pool, session.id, STEP_DISCOVERING).await?;
    let query = SearchQuery::new(topic, deps.config.per_platform_results, deps.config.max_age_days)?;
    let chains = build_platform_chains(&deps.config)?;
    let report = match discover(&chains, &query).await {
        Ok(report) => report,
        Err(e) => {
            clipscout_db::update_session_step(&deps.pool, session.id, STEP_DISCOVERY_FAILED)
                .await?;
            clipscout_db::append_activity(
                &deps.pool,
                session.id,
                "discovery_failed",
                Some(&e.detail),
            )
            .await;
            clipscout_db::complete_session(&deps.pool, session.id).await?;
            return Err(PipelineError::Discovery { detail: e.detail });
        }
    };

    for (platform, outcome) in &report.outcomes {
        clipscout_db::append_activity(
            &deps.pool,
            session.id,
            &format!("discovery_{platform}"),
            Some(&outcome.describe()),
        )
        .await;
    }

    // Ranking; persist the full ranked batch before enrichment so the
    // session has data even if later stages degrade.
    let ranked = rank(report.items);
    let rows: Vec<NewVideo> = ranked.iter().map(|item| to_new_video(item, None)).collect();
    clipscout_db::upsert_session_videos(&deps.pool, session.id, &rows).await?;

    // Enrichment
    clipscout_db::update_session_step(&deps.pool, session.id, STEP_ANALYZING).await?;
    let client = GenerationClient::new(GenerationConfig::new(
        deps.config.generation_api_key.clone(),
        &deps.config.generation_model,
        deps.config.generation_timeout_secs,
    ))?;
    let top = select_top(&ranked, deps.config.enrich_top_k);
    let enriched = match enrich_all(
        &client,
        top,
        EnrichOptions {
            interval_ms: deps.config.enrich_interval_ms,
            deadline_secs: deps.config.enrich_deadline_secs,
        },
    )
    .await
    {
        Ok(enriched) => enriched,
        Err(e) => {
            clipscout_db::update_session_step(&deps.pool, session.id, STEP_ANALYSIS_FAILED)
                .await?;
            clipscout_db::append_activity(
                &deps.pool,
                session.id,
                "analysis_unavailable",
                Some(&e.to_string()),
            )
            .await;
            clipscout_db::complete_session(&deps.pool, session.id).await?;
            return Err(e.into());
        }
    };

    let enriched_rows: Vec<NewVideo> = enriched
        .iter()
        .map(|e| to_new_video(&e.item, Some(e)))
        .collect();
    clipscout_db::upsert_session_videos(&deps.pool, session.id, &enriched_rows).await?;

    // Synthesis and drafting
    let insights = synthesize_insights(topic, &enriched);
    clipscout_db::update_session_step(&deps.pool, session.id, STEP_GENERATING).await?;
    let draft = generate_script(Some(&client), topic, &insights, &enriched).await;
    let saved =
        clipscout_db::save_script(&deps.pool, session.id, &draft.content, draft.status.as_str())
            .await?;
    clipscout_db::append_activity(
        &deps.pool,
        session.id,
        "script_saved",
        Some(&format!("version {} ({})", saved.version, draft.status.as_str())),
    )
    .await;

    clipscout_db::complete_session(&deps.pool, session.id).await?;
    tracing::info!(session = %session.public_id, "session completed");

    Ok(PipelineResult {
        session_public_id: session.public_id,
        topic: topic.to_string(),
        platform_statuses: report.outcomes,
        items: enriched,
        insights,
        script: draft.content,
        script_status: draft.status,
    })
}

#[allow(clippy::cast_possible_wrap)]
fn clamp_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[allow(clippy::cast_possible_wrap)]
fn to_new_video(item: &RankedItem, enriched: Option<&EnrichedItem>) -> NewVideo {
    let (analysis, analysis_origin) = match enriched {
        Some(e) => (
            serde_json::to_value(&e.analysis).ok(),
            Some(
                match e.origin {
                    clipscout_analysis::AnalysisOrigin::Model => "model",
                    clipscout_analysis::AnalysisOrigin::Heuristic => "heuristic",
                }
                .to_string(),
            ),
        ),
        None => (None, None),
    };

    NewVideo {
        source_id: item.video.source_id.clone(),
        platform: item.video.platform.as_str().to_string(),
        title: item.video.title.clone(),
        description: item.video.description.clone(),
        url: item.video.url.clone(),
        thumbnail_url: item.video.thumbnail_url.clone(),
        views: clamp_count(item.video.views),
        likes: clamp_count(item.video.likes),
        comments: clamp_count(item.video.comments),
        duration_secs: i32::try_from(item.video.duration_secs).unwrap_or(i32::MAX),
        published_at: item.video.published_at,
        engagement_score: item.engagement_score,
        is_viral: item.is_viral,
        analysis,
        analysis_origin,
    }
}
