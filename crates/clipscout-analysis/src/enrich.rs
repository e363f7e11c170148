//! Sequential, rate-limited enrichment with per-item degradation.
//!
//! Items are enriched one at a time in rank order, pausing between model
//! calls. A failed call degrades that one item to a heuristic analysis;
//! the batch never shrinks. Only an analyzer with no credentials at all
//! aborts the stage.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use clipscout_core::VideoRecord;

use crate::generation::{GenerationError, VideoAnalyzer};
use crate::limiter::IntervalLimiter;
use crate::types::{AnalysisOrigin, EnrichedItem, RankedItem, VideoAnalysis};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no analyzer configured for enrichment")]
    AnalyzerUnavailable,
}

#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    /// Pause between consecutive model calls.
    pub interval_ms: u64,
    /// Overall stage deadline; 0 disables it. Items past the deadline get
    /// the heuristic analysis without a model call.
    pub deadline_secs: u64,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            interval_ms: 3_000,
            deadline_secs: 0,
        }
    }
}

/// Enriches every item, in order. Output length always equals input length.
///
/// # Errors
///
/// Returns [`EnrichError::AnalyzerUnavailable`] when the analyzer has no
/// credentials; any other analyzer failure degrades only the item it hit.
pub async fn enrich_all(
    analyzer: &dyn VideoAnalyzer,
    items: Vec<RankedItem>,
    options: EnrichOptions,
) -> Result<Vec<EnrichedItem>, EnrichError> {
    if !analyzer.is_configured() {
        return Err(EnrichError::AnalyzerUnavailable);
    }

    let limiter = IntervalLimiter::from_millis(options.interval_ms);
    let deadline = (options.deadline_secs > 0)
        .then(|| Instant::now() + Duration::from_secs(options.deadline_secs));

    let mut enriched = Vec::with_capacity(items.len());
    for item in items {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(
                source_id = %item.video.source_id,
                "enrichment deadline reached, degrading remaining items"
            );
            enriched.push(degrade(item));
            continue;
        }

        limiter.acquire().await;
        match analyzer.analyze(&item.video).await {
            Ok(analysis) => enriched.push(EnrichedItem {
                item,
                analysis,
                origin: AnalysisOrigin::Model,
            }),
            Err(GenerationError::NotConfigured) => return Err(EnrichError::AnalyzerUnavailable),
            Err(e) => {
                tracing::warn!(
                    source_id = %item.video.source_id,
                    error = %e,
                    "model analysis failed, using heuristic"
                );
                enriched.push(degrade(item));
            }
        }
    }
    Ok(enriched)
}

fn degrade(item: RankedItem) -> EnrichedItem {
    let analysis = heuristic_analysis(&item.video, item.is_viral);
    EnrichedItem {
        item,
        analysis,
        origin: AnalysisOrigin::Heuristic,
    }
}

/// Title-derived stand-in analysis for when the model is unreachable.
fn heuristic_analysis(video: &VideoRecord, is_viral: bool) -> VideoAnalysis {
    let keywords: Vec<String> = video
        .title
        .split_whitespace()
        .filter(|word| word.chars().filter(|c| c.is_alphanumeric()).count() > 3)
        .take(5)
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .collect();

    let transcript = format!("[transcript unavailable] {}", video.title);
    let success_factors = if is_viral {
        vec!["high engagement relative to reach".to_string()]
    } else {
        Vec::new()
    };

    VideoAnalysis {
        translated_transcript: transcript.clone(),
        transcript,
        keywords,
        detected_language: "und".to_string(),
        success_factors,
    }
}
