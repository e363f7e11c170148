//! Self-hosted TikTok scraper sidecar adapter.
//!
//! The sidecar wraps a headless-browser scrape behind a small HTTP service
//! and always answers 200 with a `success` flag; a scrape that broke
//! mid-flight reports `success: false` plus an error string.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::chains::HttpSettings;
use crate::error::SourceError;

#[derive(Debug, Clone)]
pub struct TiktokScraperConfig {
    pub base_url: Option<String>,
    pub enabled: bool,
}

impl TiktokScraperConfig {
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            enabled: true,
        }
    }
}

pub struct TiktokScraperService {
    config: TiktokScraperConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    videos: Vec<ScrapedVideo>,
}

#[derive(Debug, Deserialize)]
struct ScrapedVideo {
    video_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    url: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    views: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

impl TiktokScraperService {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TiktokScraperConfig, http: &HttpSettings) -> Result<Self, SourceError> {
        Ok(Self {
            config,
            http: http.build_client()?,
        })
    }
}

#[async_trait]
impl SourceAdapter for TiktokScraperService {
    fn name(&self) -> &'static str {
        "tiktok_scraper_service"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        if !self.config.enabled {
            return Err(SourceError::Disabled(self.name().to_string()));
        }
        let Some(base_url) = self.config.base_url.as_deref() else {
            return Err(SourceError::NotConfigured(self.name().to_string()));
        };

        let encoded_topic = utf8_percent_encode(query.topic(), NON_ALPHANUMERIC);
        let url = format!(
            "{base_url}/search?query={encoded_topic}&max_results={}",
            query.max_results()
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::UpstreamRejected {
                context: "tiktok scraper search".to_string(),
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: ScrapeResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: "tiktok scraper search".to_string(),
                source: e,
            })?;

        if !parsed.success {
            return Err(SourceError::UpstreamRejected {
                context: "tiktok scraper search".to_string(),
                detail: parsed
                    .error
                    .unwrap_or_else(|| "scrape reported failure without detail".to_string()),
            });
        }

        let cutoff = query.published_after();
        Ok(parsed
            .videos
            .into_iter()
            .map(|video| VideoRecord {
                source_id: video.video_id,
                platform: Platform::Tiktok,
                title: video.title,
                description: video.description,
                url: video.url,
                thumbnail_url: video.thumbnail_url,
                views: video.views,
                likes: video.likes,
                comments: video.comments,
                duration_secs: video.duration,
                published_at: video.published_at,
            })
            .filter(|record| match (cutoff, record.published_at) {
                (Some(cutoff), Some(published)) => published >= cutoff,
                _ => true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings() -> HttpSettings {
        HttpSettings {
            timeout_secs: 5,
            user_agent: "clipscout-test/0.1".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_base_url_is_not_configured() {
        let adapter =
            TiktokScraperService::new(TiktokScraperConfig::new(None), &settings()).unwrap();
        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let result = adapter.search(&query).await;
        assert!(matches!(result, Err(SourceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn successful_scrape_maps_videos() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "coffee brewing"))
            .and(query_param("max_results", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "error": null,
                "videos": [
                    {
                        "video_id": "7300000001",
                        "title": "Dalgona at home",
                        "description": "Whipped coffee tutorial",
                        "url": "https://www.tiktok.com/@whisk/video/7300000001",
                        "thumbnail_url": "https://img.example/7300000001.jpg",
                        "views": 2_000_000,
                        "likes": 150_000,
                        "comments": 4_000,
                        "duration": 28,
                        "published_at": "2026-02-01T09:30:00Z"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let adapter = TiktokScraperService::new(
            TiktokScraperConfig::new(Some(server.uri())),
            &settings(),
        )
        .unwrap();
        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let records = adapter.search(&query).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_id, "7300000001");
        assert_eq!(records[0].platform, Platform::Tiktok);
        assert_eq!(records[0].views, 2_000_000);
        assert_eq!(records[0].duration_secs, 28);
    }

    #[tokio::test]
    async fn scrape_failure_flag_is_upstream_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "captcha wall",
                "videos": []
            })))
            .mount(&server)
            .await;

        let adapter = TiktokScraperService::new(
            TiktokScraperConfig::new(Some(server.uri())),
            &settings(),
        )
        .unwrap();
        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let result = adapter.search(&query).await;

        match result {
            Err(SourceError::UpstreamRejected { detail, .. }) => {
                assert!(detail.contains("captcha wall"));
            }
            other => panic!("expected UpstreamRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn topic_is_percent_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("query", "latte & art"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "videos": []
            })))
            .mount(&server)
            .await;

        let adapter = TiktokScraperService::new(
            TiktokScraperConfig::new(Some(server.uri())),
            &settings(),
        )
        .unwrap();
        let query = SearchQuery::new("latte & art", 5, 0).unwrap();
        let records = adapter.search(&query).await.unwrap();
        assert!(records.is_empty());
    }
}
