//! Command handlers for the CLI.
//!
//! These are called from `main` after config and logging are established.
//! Output is plain text aimed at a terminal, not machine parsing.

use clipscout_core::AppConfig;
use clipscout_pipeline::{run_pipeline, run_preview, PipelineDeps, SessionLocks};

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = clipscout_db::PoolConfig::from_app_config(config);
    let pool = clipscout_db::connect_pool(&config.database_url, pool_config).await?;
    clipscout_db::run_migrations(&pool).await?;
    Ok(pool)
}

pub(crate) async fn run(
    config: &AppConfig,
    user: &str,
    topic: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        let preview = run_preview(config, topic).await?;
        println!("dry-run for \"{topic}\":");
        for (platform, outcome) in &preview.platform_statuses {
            println!("  {platform}: {}", outcome.describe());
        }
        for enriched in &preview.items {
            println!(
                "  [{:.1}]{} {} ({} views) {}",
                enriched.item.engagement_score,
                if enriched.item.is_viral { " viral" } else { "" },
                enriched.item.video.title,
                enriched.item.video.views,
                enriched.item.video.url
            );
        }
        println!("  themes: {}", preview.insights.themes.join(", "));
        println!("  style: {}", preview.insights.recommended_style);
        println!(
            "  target duration: {}s",
            preview.insights.target_duration_secs
        );
        return Ok(());
    }

    let pool = connect(config).await?;
    let deps = PipelineDeps {
        pool,
        config: config.clone(),
        locks: std::sync::Arc::new(SessionLocks::new()),
    };

    let result = run_pipeline(&deps, user, topic).await?;
    println!("session {} completed", result.session_public_id);
    for (platform, outcome) in &result.platform_statuses {
        println!("  {platform}: {}", outcome.describe());
    }
    println!("  {} videos enriched", result.items.len());
    println!("  themes: {}", result.insights.themes.join(", "));
    println!("  script ({}):\n", result.script_status.as_str());
    println!("{}", result.script);
    Ok(())
}

pub(crate) async fn sessions(config: &AppConfig, user: &str, limit: i64) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let rows = clipscout_db::list_sessions(&pool, user, limit).await?;
    if rows.is_empty() {
        println!("no sessions for {user}");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}  {:9}  {:16}  {}  {}",
            row.public_id,
            row.status,
            row.current_step.as_deref().unwrap_or("-"),
            row.created_at.format("%Y-%m-%d %H:%M"),
            row.topic
        );
    }
    Ok(())
}

pub(crate) async fn videos(
    config: &AppConfig,
    session: uuid::Uuid,
    viral_only: bool,
    limit: i64,
) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let row = clipscout_db::get_session_by_public_id(&pool, session).await?;
    let videos = clipscout_db::get_session_videos(&pool, row.id, viral_only, limit).await?;
    if videos.is_empty() {
        println!("no videos recorded for session {session}");
        return Ok(());
    }
    for video in videos {
        println!(
            "[{:.1}]{} {:9} {} ({} views, {} likes, {} comments) {}",
            video.engagement_score,
            if video.is_viral { " viral" } else { "" },
            video.platform,
            video.title,
            video.views,
            video.likes,
            video.comments,
            video.url
        );
    }
    Ok(())
}

pub(crate) async fn cancel(config: &AppConfig, session: uuid::Uuid) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let row = clipscout_db::get_session_by_public_id(&pool, session).await?;
    clipscout_db::cancel_session(&pool, row.id).await?;
    println!("session {session} cancelled");
    Ok(())
}

pub(crate) async fn script(config: &AppConfig, session: uuid::Uuid) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let row = clipscout_db::get_session_by_public_id(&pool, session).await?;
    let script = clipscout_db::get_latest_script(&pool, row.id).await?;
    println!(
        "version {} ({}) from {}\n",
        script.version,
        script.status,
        script.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("{}", script.content);
    Ok(())
}
