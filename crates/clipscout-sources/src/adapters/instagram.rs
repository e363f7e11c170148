//! Instagram Graph API hashtag adapter.
//!
//! Two calls per search: `ig_hashtag_search` to resolve the hashtag id for
//! the topic, then `{hashtag-id}/top_media` for its top posts. Only video
//! media types survive the mapping; the Graph API exposes no view counts on
//! hashtag media, so views stay 0 and records rank by likes and comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::chains::HttpSettings;
use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v21.0";

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub enabled: bool,
    pub base_url: String,
}

impl InstagramConfig {
    #[must_use]
    pub fn new(access_token: Option<String>, user_id: Option<String>) -> Self {
        Self {
            access_token,
            user_id,
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

pub struct InstagramGraphApi {
    config: InstagramConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HashtagSearchResponse {
    #[serde(default)]
    data: Vec<HashtagId>,
}

#[derive(Debug, Deserialize)]
struct HashtagId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TopMediaResponse {
    #[serde(default)]
    data: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: String,
    #[serde(default)]
    media_type: String,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    comments_count: u64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl InstagramGraphApi {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: InstagramConfig, http: &HttpSettings) -> Result<Self, SourceError> {
        Ok(Self {
            config,
            http: http.build_client()?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, SourceError> {
        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::UpstreamRejected {
                context: context.to_string(),
                detail: format!("HTTP {status}: {body}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl SourceAdapter for InstagramGraphApi {
    fn name(&self) -> &'static str {
        "instagram_graph_api"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        if !self.config.enabled {
            return Err(SourceError::Disabled(self.name().to_string()));
        }
        let (Some(token), Some(user_id)) = (
            self.config.access_token.as_deref(),
            self.config.user_id.as_deref(),
        ) else {
            return Err(SourceError::NotConfigured(self.name().to_string()));
        };

        // Hashtags cannot contain spaces; collapse the topic into one tag.
        let hashtag: String = query
            .topic()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let search_url = format!("{}/ig_hashtag_search", self.config.base_url);
        let search: HashtagSearchResponse = self
            .get_json(
                &search_url,
                &[
                    ("user_id", user_id),
                    ("q", hashtag.as_str()),
                    ("access_token", token),
                ],
                "instagram hashtag search",
            )
            .await?;

        let Some(hashtag_id) = search.data.into_iter().next().map(|h| h.id) else {
            return Ok(vec![]);
        };

        let media_url = format!("{}/{hashtag_id}/top_media", self.config.base_url);
        let limit = query.max_results().to_string();
        let media: TopMediaResponse = self
            .get_json(
                &media_url,
                &[
                    ("user_id", user_id),
                    (
                        "fields",
                        "id,media_type,caption,permalink,like_count,comments_count,timestamp",
                    ),
                    ("limit", limit.as_str()),
                    ("access_token", token),
                ],
                "instagram top media",
            )
            .await?;

        let cutoff = query.published_after();
        Ok(media
            .data
            .into_iter()
            .filter(|item| item.media_type == "VIDEO" || item.media_type == "REELS")
            .map(|item| {
                let title = item
                    .caption
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                VideoRecord {
                    source_id: item.id,
                    platform: Platform::Instagram,
                    title,
                    description: item.caption,
                    url: item.permalink,
                    thumbnail_url: String::new(),
                    views: 0,
                    likes: item.like_count,
                    comments: item.comments_count,
                    duration_secs: 0,
                    published_at: item.timestamp,
                }
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

    fn configured(server: &MockServer) -> InstagramGraphApi {
        let config = InstagramConfig::new(
            Some("graph-token".to_string()),
            Some("1789".to_string()),
        )
        .with_base_url(&server.uri());
        InstagramGraphApi::new(config, &settings()).unwrap()
    }

    #[tokio::test]
    async fn missing_credentials_is_not_configured() {
        let adapter = InstagramGraphApi::new(
            InstagramConfig::new(Some("token".to_string()), None),
            &settings(),
        )
        .unwrap();
        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let result = adapter.search(&query).await;
        assert!(matches!(result, Err(SourceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn search_filters_to_video_media() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ig_hashtag_search"))
            .and(query_param("q", "coffeebrewing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": "17843" }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/17843/top_media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {
                        "id": "ig1",
                        "media_type": "REELS",
                        "caption": "Siphon brew demo\n#coffee",
                        "permalink": "https://www.instagram.com/reel/ig1/",
                        "like_count": 9_000,
                        "comments_count": 210,
                        "timestamp": "2026-02-10T12:00:00Z"
                    },
                    {
                        "id": "ig2",
                        "media_type": "IMAGE",
                        "caption": "Bean photo",
                        "permalink": "https://www.instagram.com/p/ig2/",
                        "like_count": 50,
                        "comments_count": 1
                    }
                ]
            })))
            .mount(&server)
            .await;

        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let records = configured(&server).search(&query).await.unwrap();

        assert_eq!(records.len(), 1, "image posts are dropped");
        assert_eq!(records[0].source_id, "ig1");
        assert_eq!(records[0].platform, Platform::Instagram);
        assert_eq!(records[0].title, "Siphon brew demo");
        assert_eq!(records[0].views, 0, "hashtag media has no view counts");
        assert_eq!(records[0].likes, 9_000);
    }

    #[tokio::test]
    async fn unknown_hashtag_is_empty_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ig_hashtag_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let query = SearchQuery::new("zzznotahashtag", 5, 0).unwrap();
        let records = configured(&server).search(&query).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn graph_error_is_upstream_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ig_hashtag_search"))
            .respond_with(ResponseTemplate::new(400).set_body_string("expired token"))
            .mount(&server)
            .await;

        let query = SearchQuery::new("coffee brewing", 5, 0).unwrap();
        let result = configured(&server).search(&query).await;
        assert!(matches!(result, Err(SourceError::UpstreamRejected { .. })));
    }
}
