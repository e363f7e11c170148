//! Concurrent multi-platform discovery.
//!
//! One fallback-chain invocation per configured platform, run concurrently.
//! Each platform settles independently into exactly one [`PlatformOutcome`];
//! the merge runs only after every platform has settled, so it never
//! observes a partial result.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::fallback::run_fallback_chain;

/// How one platform's discovery settled. Exactly one per platform per run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlatformOutcome {
    Success { count: usize, served_by: String },
    Empty,
    Skipped { reason: String },
    Failed { reason: String },
}

impl PlatformOutcome {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            PlatformOutcome::Success { count, served_by } => {
                format!("{count} items via {served_by}")
            }
            PlatformOutcome::Empty => "no matches".to_string(),
            PlatformOutcome::Skipped { reason } => format!("skipped: {reason}"),
            PlatformOutcome::Failed { reason } => format!("failed: {reason}"),
        }
    }
}

/// Merged, deduplicated output of one discovery run.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub outcomes: BTreeMap<Platform, PlatformOutcome>,
    pub items: Vec<VideoRecord>,
}

/// Every platform either found nothing, was skipped, or failed.
///
/// "Ran successfully but found nothing, everywhere" is a failed discovery
/// for downstream purposes; the detail enumerates each platform's outcome
/// so the caller can see why.
#[derive(Debug, Error)]
#[error("no videos found on any platform: {detail}")]
pub struct NoResultsError {
    pub detail: String,
    pub outcomes: BTreeMap<Platform, PlatformOutcome>,
}

/// Fans out to every platform chain concurrently and merges the results.
///
/// Per-platform failures never abort the run; they become status metadata.
/// The merged item set is independent of the order in which platform calls
/// settle.
///
/// # Errors
///
/// Returns [`NoResultsError`] only when the merged collection is empty.
pub async fn discover(
    chains: &BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>>,
    query: &SearchQuery,
) -> Result<DiscoveryReport, NoResultsError> {
    let settled = futures::future::join_all(chains.iter().map(|(platform, adapters)| async move {
        (*platform, run_fallback_chain(adapters, query).await)
    }))
    .await;

    let mut outcomes = BTreeMap::new();
    let mut batches: BTreeMap<Platform, Vec<VideoRecord>> = BTreeMap::new();

    for (platform, result) in settled {
        let outcome = match result {
            Ok(outcome) if outcome.items.is_empty() => PlatformOutcome::Empty,
            Ok(outcome) => {
                let summary = PlatformOutcome::Success {
                    count: outcome.items.len(),
                    served_by: outcome.served_by.to_string(),
                };
                batches.insert(platform, outcome.items);
                summary
            }
            Err(e) if e.is_configuration_skip() => PlatformOutcome::Skipped {
                reason: e.to_string(),
            },
            Err(e) => {
                tracing::warn!(platform = %platform, error = %e, "platform discovery failed");
                PlatformOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        outcomes.insert(platform, outcome);
    }

    let items = merge_batches(batches);

    if items.is_empty() {
        let detail = outcomes
            .iter()
            .map(|(platform, outcome)| format!("{platform}: {}", outcome.describe()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(NoResultsError { detail, outcomes });
    }

    Ok(DiscoveryReport { outcomes, items })
}

/// Merges per-platform batches in platform order, upserting duplicates.
///
/// A later record with an already-seen `(source_id, platform)` identity
/// refreshes the numeric metrics (taking the maximum of each count) but
/// never duplicates the record.
fn merge_batches(batches: BTreeMap<Platform, Vec<VideoRecord>>) -> Vec<VideoRecord> {
    let mut merged: Vec<VideoRecord> = Vec::new();
    let mut index: HashMap<(String, Platform), usize> = HashMap::new();

    for batch in batches.into_values() {
        for record in batch {
            let key = (record.source_id.clone(), record.platform);
            if let Some(&slot) = index.get(&key) {
                let existing = &mut merged[slot];
                existing.views = existing.views.max(record.views);
                existing.likes = existing.likes.max(record.likes);
                existing.comments = existing.comments.max(record.comments);
            } else {
                index.insert(key, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::SourceError;

    use super::*;

    enum StubBehavior {
        Items(Vec<VideoRecord>),
        Empty,
        NotConfigured,
        Fail,
    }

    struct StubAdapter {
        name: &'static str,
        behavior: StubBehavior,
        delay_ms: u64,
    }

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            match &self.behavior {
                StubBehavior::Items(items) => Ok(items.clone()),
                StubBehavior::Empty => Ok(vec![]),
                StubBehavior::NotConfigured => {
                    Err(SourceError::NotConfigured(self.name.to_string()))
                }
                StubBehavior::Fail => Err(SourceError::UpstreamRejected {
                    context: self.name.to_string(),
                    detail: "HTTP 502".to_string(),
                }),
            }
        }
    }

    fn chain(
        name: &'static str,
        behavior: StubBehavior,
        delay_ms: u64,
    ) -> Vec<Box<dyn SourceAdapter>> {
        vec![Box::new(StubAdapter {
            name,
            behavior,
            delay_ms,
        })]
    }

    fn video(id: &str, platform: Platform, views: u64, likes: u64, comments: u64) -> VideoRecord {
        VideoRecord {
            source_id: id.to_string(),
            platform,
            title: format!("video {id}"),
            description: String::new(),
            url: format!("https://example.com/{id}"),
            thumbnail_url: String::new(),
            views,
            likes,
            comments,
            duration_secs: 45,
            published_at: None,
        }
    }

    fn query() -> SearchQuery {
        SearchQuery::new("coffee brewing", 5, 30).unwrap()
    }

    #[tokio::test]
    async fn one_successful_platform_carries_the_run() {
        // Platform A: 2 items, B: not configured, C: empty. The run
        // still succeeds with A's 2 items.
        let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();
        chains.insert(
            Platform::Youtube,
            chain(
                "youtube_data_api",
                StubBehavior::Items(vec![
                    video("a1", Platform::Youtube, 200_000, 100, 50),
                    video("a2", Platform::Youtube, 50, 1, 0),
                ]),
                0,
            ),
        );
        chains.insert(
            Platform::Tiktok,
            chain("tiktok_research_api", StubBehavior::NotConfigured, 0),
        );
        chains.insert(
            Platform::Instagram,
            chain("instagram_graph_api", StubBehavior::Empty, 0),
        );

        let report = discover(&chains, &query()).await.unwrap();
        assert_eq!(report.items.len(), 2);
        assert!(matches!(
            report.outcomes[&Platform::Youtube],
            PlatformOutcome::Success { count: 2, .. }
        ));
        assert!(matches!(
            report.outcomes[&Platform::Tiktok],
            PlatformOutcome::Skipped { .. }
        ));
        assert_eq!(report.outcomes[&Platform::Instagram], PlatformOutcome::Empty);
    }

    #[tokio::test]
    async fn all_empty_or_skipped_is_overall_failure_with_detail() {
        let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();
        chains.insert(Platform::Youtube, chain("youtube_data_api", StubBehavior::Empty, 0));
        chains.insert(
            Platform::Tiktok,
            chain("tiktok_research_api", StubBehavior::NotConfigured, 0),
        );
        chains.insert(
            Platform::Instagram,
            chain("instagram_graph_api", StubBehavior::Empty, 0),
        );

        let err = discover(&chains, &query()).await.unwrap_err();
        for platform in ["youtube", "tiktok", "instagram"] {
            assert!(
                err.detail.contains(platform),
                "detail must mention {platform}: {}",
                err.detail
            );
        }
        assert_eq!(err.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn all_failed_is_overall_failure() {
        let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();
        chains.insert(Platform::Youtube, chain("youtube_data_api", StubBehavior::Fail, 0));
        chains.insert(Platform::Tiktok, chain("tiktok_research_api", StubBehavior::Fail, 0));

        let err = discover(&chains, &query()).await.unwrap_err();
        assert!(err.detail.contains("failed"));
    }

    #[tokio::test]
    async fn merge_is_independent_of_settle_order() {
        let youtube_items = vec![
            video("y1", Platform::Youtube, 1_000, 10, 2),
            video("y2", Platform::Youtube, 2_000, 20, 4),
        ];
        let tiktok_items = vec![video("t1", Platform::Tiktok, 3_000, 30, 6)];

        // Run twice with inverted per-platform delays so the platforms
        // settle in opposite orders.
        let mut merged_runs = Vec::new();
        for (youtube_delay, tiktok_delay) in [(30, 0), (0, 30)] {
            let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();
            chains.insert(
                Platform::Youtube,
                chain(
                    "youtube_data_api",
                    StubBehavior::Items(youtube_items.clone()),
                    youtube_delay,
                ),
            );
            chains.insert(
                Platform::Tiktok,
                chain(
                    "tiktok_research_api",
                    StubBehavior::Items(tiktok_items.clone()),
                    tiktok_delay,
                ),
            );
            let report = discover(&chains, &query()).await.unwrap();
            merged_runs.push(report.items);
        }

        assert_eq!(merged_runs[0], merged_runs[1]);
    }

    #[tokio::test]
    async fn duplicate_identities_are_upsert_merged() {
        let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();
        chains.insert(
            Platform::Youtube,
            chain(
                "youtube_data_api",
                StubBehavior::Items(vec![
                    video("dup", Platform::Youtube, 100, 5, 1),
                    video("dup", Platform::Youtube, 300, 2, 9),
                ]),
                0,
            ),
        );

        let report = discover(&chains, &query()).await.unwrap();
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].views, 300);
        assert_eq!(report.items[0].likes, 5);
        assert_eq!(report.items[0].comments, 9);
    }
}
