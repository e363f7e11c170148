//! Database-free dry run: discover, rank, and synthesize without touching
//! Postgres or the model. Used by the CLI's `--dry-run` flag.

use std::collections::BTreeMap;

use clipscout_analysis::{rank, select_top, synthesize_insights, EnrichedItem, InsightSet};
use clipscout_analysis::types::{AnalysisOrigin, VideoAnalysis};
use clipscout_core::{AppConfig, Platform};
use clipscout_sources::{build_platform_chains, discover, PlatformOutcome, SearchQuery};

use crate::PipelineError;

#[derive(Debug)]
pub struct PreviewResult {
    pub platform_statuses: BTreeMap<Platform, PlatformOutcome>,
    pub items: Vec<EnrichedItem>,
    pub insights: InsightSet,
}

/// Runs discovery and ranking, then synthesizes insights from title-derived
/// analyses. Nothing is persisted and no model calls are made.
///
/// # Errors
///
/// Returns [`PipelineError::Discovery`] when every platform comes back
/// empty, or [`PipelineError::Source`] on invalid input.
pub async fn run_preview(config: &AppConfig, topic: &str) -> Result<PreviewResult, PipelineError> {
    let query = SearchQuery::new(topic, config.per_platform_results, config.max_age_days)?;
    let chains = build_platform_chains(config)?;
    let report = discover(&chains, &query)
        .await
        .map_err(|e| PipelineError::Discovery { detail: e.detail })?;

    let ranked = rank(report.items);
    let items: Vec<EnrichedItem> = select_top(&ranked, config.enrich_top_k)
        .into_iter()
        .map(|item| {
            let keywords: Vec<String> = item
                .video
                .title
                .split_whitespace()
                .filter(|word| word.chars().filter(|c| c.is_alphanumeric()).count() > 3)
                .take(5)
                .map(str::to_lowercase)
                .collect();
            EnrichedItem {
                analysis: VideoAnalysis {
                    transcript: format!("[preview] {}", item.video.title),
                    translated_transcript: format!("[preview] {}", item.video.title),
                    keywords,
                    detected_language: "und".to_string(),
                    success_factors: Vec::new(),
                },
                origin: AnalysisOrigin::Heuristic,
                item,
            }
        })
        .collect();

    let insights = synthesize_insights(topic, &items);
    Ok(PreviewResult {
        platform_statuses: report.outcomes,
        items,
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preview_works_offline_with_fixtures() {
        let mut config = AppConfig::for_tests();
        config.use_fixture_sources = true;

        let preview = run_preview(&config, "coffee brewing").await.unwrap();

        assert_eq!(preview.platform_statuses.len(), 3);
        assert!(!preview.items.is_empty());
        assert!(preview.items.len() <= config.enrich_top_k);
        // Ranked best-first.
        for pair in preview.items.windows(2) {
            assert!(pair[0].item.engagement_score >= pair[1].item.engagement_score);
        }
        assert!(!preview.insights.themes.is_empty());
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let mut config = AppConfig::for_tests();
        config.use_fixture_sources = true;

        let result = run_preview(&config, "   ").await;
        assert!(matches!(result, Err(PipelineError::Source(_))));
    }
}
