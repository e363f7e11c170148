//! Invidious search adapter, the keyless fallback for `YouTube`.
//!
//! Invidious mirrors `YouTube` search without requiring an API key, but its
//! search payload carries no like or comment counts; those default to 0 and
//! the records still rank by views.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::chains::HttpSettings;
use crate::error::SourceError;

#[derive(Debug, Clone)]
pub struct InvidiousConfig {
    pub base_url: Option<String>,
    pub enabled: bool,
}

impl InvidiousConfig {
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            enabled: true,
        }
    }
}

pub struct InvidiousSearch {
    config: InvidiousConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    video_id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    video_thumbnails: Vec<VideoThumbnail>,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    length_seconds: u32,
    /// Unix seconds.
    #[serde(default)]
    published: i64,
}

#[derive(Debug, Deserialize)]
struct VideoThumbnail {
    url: String,
}

impl InvidiousSearch {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: InvidiousConfig, http: &HttpSettings) -> Result<Self, SourceError> {
        Ok(Self {
            config,
            http: http.build_client()?,
        })
    }
}

#[async_trait]
impl SourceAdapter for InvidiousSearch {
    fn name(&self) -> &'static str {
        "invidious_search"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        if !self.config.enabled {
            return Err(SourceError::Disabled(self.name().to_string()));
        }
        let Some(base_url) = self.config.base_url.as_deref() else {
            return Err(SourceError::NotConfigured(self.name().to_string()));
        };

        let url = format!("{base_url}/api/v1/search");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.topic()),
                ("type", "video"),
                ("sort_by", "views"),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::UpstreamRejected {
                context: "invidious search".to_string(),
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: "invidious search".to_string(),
                source: e,
            })?;

        let cutoff = query.published_after();
        let mut records: Vec<VideoRecord> = hits
            .into_iter()
            .map(|hit| {
                let published_at = DateTime::<Utc>::from_timestamp(hit.published, 0);
                VideoRecord {
                    url: format!("https://www.youtube.com/watch?v={}", hit.video_id),
                    source_id: hit.video_id,
                    platform: Platform::Youtube,
                    title: hit.title,
                    description: hit.description,
                    thumbnail_url: hit
                        .video_thumbnails
                        .into_iter()
                        .next()
                        .map(|t| t.url)
                        .unwrap_or_default(),
                    views: hit.view_count,
                    likes: 0,
                    comments: 0,
                    duration_secs: hit.length_seconds,
                    published_at,
                }
            })
            .filter(|record| match (cutoff, record.published_at) {
                (Some(cutoff), Some(published)) => published >= cutoff,
                _ => true,
            })
            .collect();
        records.truncate(query.max_results() as usize);
        Ok(records)
    }
}
