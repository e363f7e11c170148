//! Deterministic in-process adapter for local development and tests.
//!
//! Serves a canned catalogue per platform so the full pipeline can run
//! without network access or credentials. Enabled via
//! `CLIPSCOUT_USE_FIXTURE_SOURCES`.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::error::SourceError;

pub struct FixtureAdapter {
    platform: Platform,
}

impl FixtureAdapter {
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn catalogue(&self, topic: &str) -> Vec<VideoRecord> {
        let seeds: &[(u64, u64, u64, u32)] = &[
            (250_000, 18_000, 900, 42),
            (80_000, 2_400, 150, 95),
            (12_000, 300, 25, 180),
            (600_000, 95_000, 3_100, 30),
            (4_500, 90, 8, 240),
            (150_000, 7_000, 420, 61),
        ];

        seeds
            .iter()
            .enumerate()
            .map(|(i, &(views, likes, comments, duration_secs))| {
                let id = format!("fixture-{}-{}", self.platform, i + 1);
                VideoRecord {
                    url: format!("https://fixtures.local/{}/{id}", self.platform),
                    title: format!("{topic} clip {}", i + 1),
                    description: format!("Fixture coverage of {topic}"),
                    thumbnail_url: format!("https://fixtures.local/thumb/{id}.jpg"),
                    source_id: id,
                    platform: self.platform,
                    views,
                    likes,
                    comments,
                    duration_secs,
                    published_at: Some(Utc::now() - Duration::days(i as i64 + 1)),
                }
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for FixtureAdapter {
    fn name(&self) -> &'static str {
        match self.platform {
            Platform::Youtube => "fixture_youtube",
            Platform::Tiktok => "fixture_tiktok",
            Platform::Instagram => "fixture_instagram",
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        let mut records = self.catalogue(query.topic());
        records.truncate(query.max_results() as usize);
        Ok(records)
    }
}
