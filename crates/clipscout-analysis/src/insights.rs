//! Cross-video insight synthesis.
//!
//! Pure aggregation over an enriched batch; no I/O and no randomness, so
//! the same batch always yields the same insights.

use std::collections::HashMap;

use crate::types::{EnrichedItem, InsightSet};

const MAX_THEMES: usize = 5;
const MAX_VIRAL_PATTERNS: usize = 5;

/// Distills an enriched batch into themes, viral patterns, a recommended
/// style, a target duration, and topic-seeded key phrases.
///
/// An empty batch is a caller error; the pipeline short-circuits on failed
/// discovery before this stage runs.
#[must_use]
pub fn synthesize_insights(topic: &str, items: &[EnrichedItem]) -> InsightSet {
    debug_assert!(!items.is_empty(), "insights require at least one item");

    let themes = top_keywords(items);
    let viral_patterns = viral_patterns(items);

    let viral_count = items.iter().filter(|e| e.item.is_viral).count();
    // Strict majority of viral items flips the style recommendation.
    let recommended_style = if viral_count * 2 > items.len() {
        "fast-paced, hook-driven"
    } else {
        "steady, narrative-led"
    }
    .to_string();

    let key_phrases = if themes.is_empty() {
        vec![topic.to_string()]
    } else {
        themes.iter().map(|theme| format!("{topic} {theme}")).collect()
    };

    InsightSet {
        themes,
        viral_patterns,
        recommended_style,
        target_duration_secs: target_duration(items, viral_count),
        key_phrases,
    }
}

/// Most frequent keywords, ties broken by first appearance in the batch.
fn top_keywords(items: &[EnrichedItem]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for item in items {
        for keyword in &item.analysis.keywords {
            let entry = counts.entry(keyword.as_str()).or_insert(0);
            if *entry == 0 {
                first_seen.push(keyword.as_str());
            }
            *entry += 1;
        }
    }

    let mut ordered: Vec<(usize, &str)> = first_seen
        .iter()
        .enumerate()
        .map(|(rank, &keyword)| (rank, keyword))
        .collect();
    ordered.sort_by(|a, b| counts[b.1].cmp(&counts[a.1]).then(a.0.cmp(&b.0)));

    ordered
        .into_iter()
        .take(MAX_THEMES)
        .map(|(_, keyword)| keyword.to_string())
        .collect()
}

/// Distinct success factors from viral items, in encounter order.
fn viral_patterns(items: &[EnrichedItem]) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();
    for item in items.iter().filter(|e| e.item.is_viral) {
        for factor in &item.analysis.success_factors {
            if !patterns.contains(factor) {
                patterns.push(factor.clone());
                if patterns.len() == MAX_VIRAL_PATTERNS {
                    return patterns;
                }
            }
        }
    }
    patterns
}

/// Mean duration of the viral subset, or of the whole batch when nothing
/// went viral. Rounded to the nearest second.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn target_duration(items: &[EnrichedItem], viral_count: usize) -> u32 {
    let durations: Vec<u32> = if viral_count > 0 {
        items
            .iter()
            .filter(|e| e.item.is_viral)
            .map(|e| e.item.video.duration_secs)
            .collect()
    } else {
        items.iter().map(|e| e.item.video.duration_secs).collect()
    };

    if durations.is_empty() {
        return 0;
    }
    let sum: u64 = durations.iter().map(|&d| u64::from(d)).sum();
    (sum as f64 / durations.len() as f64).round() as u32
}
