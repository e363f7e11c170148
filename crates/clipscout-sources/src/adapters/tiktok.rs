//! Official TikTok Research API adapter.
//!
//! The Research API is gated behind an access token and a keyword query
//! expressed as a nested condition object. Video URLs are reconstructed
//! from the author handle and numeric id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::chains::HttpSettings;
use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com";

#[derive(Debug, Clone)]
pub struct TiktokConfig {
    pub access_token: Option<String>,
    pub enabled: bool,
    pub base_url: String,
}

impl TiktokConfig {
    #[must_use]
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            access_token,
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

pub struct TiktokResearchApi {
    config: TiktokConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: QueryData,
}

#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    videos: Vec<ResearchVideo>,
}

#[derive(Debug, Deserialize)]
struct ResearchVideo {
    id: u64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    video_description: String,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    comment_count: u64,
    #[serde(default)]
    duration: u32,
    /// Unix seconds.
    #[serde(default)]
    create_time: i64,
}

impl TiktokResearchApi {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TiktokConfig, http: &HttpSettings) -> Result<Self, SourceError> {
        Ok(Self {
            config,
            http: http.build_client()?,
        })
    }
}

#[async_trait]
impl SourceAdapter for TiktokResearchApi {
    fn name(&self) -> &'static str {
        "tiktok_research_api"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        if !self.config.enabled {
            return Err(SourceError::Disabled(self.name().to_string()));
        }
        let Some(token) = self.config.access_token.as_deref() else {
            return Err(SourceError::NotConfigured(self.name().to_string()));
        };

        let url = format!("{}/v2/research/video/query/", self.config.base_url);
        let body = json!({
            "query": {
                "and": [
                    {
                        "operation": "IN",
                        "field_name": "keyword",
                        "field_values": [query.topic()]
                    }
                ]
            },
            "max_count": query.max_results()
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .query(&[(
                "fields",
                "id,username,video_description,view_count,like_count,comment_count,duration,create_time",
            )])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::UpstreamRejected {
                context: "tiktok research query".to_string(),
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: QueryResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Deserialize {
                context: "tiktok research query".to_string(),
                source: e,
            })?;

        let cutoff = query.published_after();
        Ok(parsed
            .data
            .videos
            .into_iter()
            .map(|video| {
                let title = first_line(&video.video_description);
                VideoRecord {
                    source_id: video.id.to_string(),
                    platform: Platform::Tiktok,
                    url: format!(
                        "https://www.tiktok.com/@{}/video/{}",
                        video.username, video.id
                    ),
                    title,
                    description: video.video_description,
                    thumbnail_url: String::new(),
                    views: video.view_count,
                    likes: video.like_count,
                    comments: video.comment_count,
                    duration_secs: video.duration,
                    published_at: DateTime::<Utc>::from_timestamp(video.create_time, 0),
                }
            })
            .filter(|record| match (cutoff, record.published_at) {
                (Some(cutoff), Some(published)) => published >= cutoff,
                _ => true,
            })
            .collect())
    }
}

/// TikTok has no title field; the first line of the description stands in.
fn first_line(description: &str) -> String {
    description
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings() -> HttpSettings {
        HttpSettings {
            timeout_secs: 5,
            user_agent: "clipscout-test/0.1".to_string(),
        }
    }

    fn query() -> SearchQuery {
        SearchQuery::new("coffee brewing", 5, 0).unwrap()
    }

    #[test]
    fn first_line_takes_leading_text() {
        assert_eq!(first_line("Best pour-over\n#coffee #brew"), "Best pour-over");
        assert_eq!(first_line(""), "");
    }

    #[tokio::test]
    async fn missing_token_is_not_configured() {
        let adapter = TiktokResearchApi::new(TiktokConfig::new(None), &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(result, Err(SourceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn query_sends_bearer_and_maps_videos() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/video/query/"))
            .and(header("authorization", "Bearer research-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "videos": [
                        {
                            "id": 7_312_345_678_901_u64,
                            "username": "brewmaster",
                            "video_description": "Perfect latte art\n#coffee",
                            "view_count": 500_000,
                            "like_count": 80_000,
                            "comment_count": 1_200,
                            "duration": 34,
                            "create_time": 1_768_000_000
                        }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let config =
            TiktokConfig::new(Some("research-token".to_string())).with_base_url(&server.uri());
        let adapter = TiktokResearchApi::new(config, &settings()).unwrap();
        let records = adapter.search(&query()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].platform, Platform::Tiktok);
        assert_eq!(records[0].title, "Perfect latte art");
        assert_eq!(
            records[0].url,
            "https://www.tiktok.com/@brewmaster/video/7312345678901"
        );
        assert_eq!(records[0].views, 500_000);
        assert_eq!(records[0].duration_secs, 34);
    }

    #[tokio::test]
    async fn rejected_query_is_upstream_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/video/query/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let config = TiktokConfig::new(Some("bad".to_string())).with_base_url(&server.uri());
        let adapter = TiktokResearchApi::new(config, &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(result, Err(SourceError::UpstreamRejected { .. })));
    }
}
