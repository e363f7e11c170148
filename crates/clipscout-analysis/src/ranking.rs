//! Engagement scoring and ordering.

use std::cmp::Ordering;

use clipscout_core::VideoRecord;

use crate::types::RankedItem;

const VIRAL_SCORE_THRESHOLD: f64 = 15.0;
const VIRAL_VIEW_THRESHOLD: u64 = 100_000;

/// Engagement per hundred views, with comments weighted double.
///
/// Zero views scores 0 rather than dividing by zero; a zero-view video with
/// likes still ranks below any video with real engagement.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_score(video: &VideoRecord) -> f64 {
    if video.views == 0 {
        return 0.0;
    }
    let interactions = video.likes as f64 + video.comments as f64 * 2.0;
    interactions / video.views as f64 * 100.0
}

fn is_viral(video: &VideoRecord, score: f64) -> bool {
    score > VIRAL_SCORE_THRESHOLD || video.views > VIRAL_VIEW_THRESHOLD
}

/// Scores and sorts a batch: engagement score descending, views breaking
/// ties. The sort is stable, so equally-scored equal-view items keep their
/// input order.
#[must_use]
pub fn rank(videos: Vec<VideoRecord>) -> Vec<RankedItem> {
    let mut ranked: Vec<RankedItem> = videos
        .into_iter()
        .map(|video| {
            let score = engagement_score(&video);
            RankedItem {
                is_viral: is_viral(&video, score),
                engagement_score: score,
                video,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.engagement_score
            .partial_cmp(&a.engagement_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.video.views.cmp(&a.video.views))
    });
    ranked
}

/// The top `k` of an already-ranked batch.
#[must_use]
pub fn select_top(ranked: &[RankedItem], k: usize) -> Vec<RankedItem> {
    ranked.iter().take(k).cloned().collect()
}
