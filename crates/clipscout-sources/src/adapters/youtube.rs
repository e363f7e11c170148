//! Official `YouTube` Data API v3 adapter.
//!
//! Two calls per search: `search` to resolve matching video ids, then
//! `videos` to fetch statistics and duration for those ids. Statistics are
//! returned by the API as decimal strings and default to 0 when absent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use clipscout_core::{Platform, VideoRecord};

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::chains::HttpSettings;
use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Per-instance configuration, injected at construction.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: Option<String>,
    pub enabled: bool,
    pub base_url: String,
}

impl YoutubeConfig {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the adapter at a mock server in tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

pub struct YoutubeDataApi {
    config: YoutubeConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

impl YoutubeDataApi {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: YoutubeConfig, http: &HttpSettings) -> Result<Self, SourceError> {
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
impl SourceAdapter for YoutubeDataApi {
    fn name(&self) -> &'static str {
        "youtube_data_api"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError> {
        if !self.config.enabled {
            return Err(SourceError::Disabled(self.name().to_string()));
        }
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(SourceError::NotConfigured(self.name().to_string()));
        };

        let max_results = query.max_results().to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("order", "viewCount"),
            ("q", query.topic()),
            ("maxResults", max_results.as_str()),
            ("key", api_key),
        ];
        let published_after = query.published_after().map(|t| t.to_rfc3339());
        if let Some(cutoff) = published_after.as_deref() {
            params.push(("publishedAfter", cutoff));
        }

        let search_url = format!("{}/search", self.config.base_url);
        let search: SearchResponse = self
            .get_json(&search_url, &params, "youtube search")
            .await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let joined_ids = ids.join(",");
        let videos_url = format!("{}/videos", self.config.base_url);
        let videos: VideosResponse = self
            .get_json(
                &videos_url,
                &[
                    ("part", "snippet,statistics,contentDetails"),
                    ("id", joined_ids.as_str()),
                    ("key", api_key),
                ],
                "youtube videos",
            )
            .await?;

        Ok(videos
            .items
            .into_iter()
            .map(|item| {
                let thumbnail_url = item
                    .snippet
                    .thumbnails
                    .high
                    .or(item.snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                VideoRecord {
                    url: format!("https://www.youtube.com/watch?v={}", item.id),
                    source_id: item.id,
                    platform: Platform::Youtube,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    thumbnail_url,
                    views: parse_count(item.statistics.view_count.as_deref()),
                    likes: parse_count(item.statistics.like_count.as_deref()),
                    comments: parse_count(item.statistics.comment_count.as_deref()),
                    duration_secs: parse_iso8601_duration(&item.content_details.duration),
                    published_at: item.snippet.published_at,
                }
            })
            .collect())
    }
}

/// Parses one of the API's decimal-string counters, defaulting to 0.
fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

/// Converts an ISO-8601 duration (`PT1H2M3S`, `P1DT2H`) to whole seconds.
///
/// Unparseable input yields 0, matching the metric-defaulting rule.
fn parse_iso8601_duration(raw: &str) -> u32 {
    let Some(rest) = raw.strip_prefix('P') else {
        return 0;
    };

    let mut total: u32 = 0;
    let mut digits = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: u32 = digits.parse().unwrap_or(0);
        digits.clear();
        total = total.saturating_add(match ch {
            'D' => value.saturating_mul(86_400),
            'H' => value.saturating_mul(3_600),
            'M' => value.saturating_mul(60),
            'S' => value,
            _ => 0,
        });
    }
    total
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

    fn query() -> SearchQuery {
        SearchQuery::new("coffee brewing", 5, 0).unwrap()
    }

    #[test]
    fn duration_parses_minutes_and_seconds() {
        assert_eq!(parse_iso8601_duration("PT1M30S"), 90);
        assert_eq!(parse_iso8601_duration("PT2H"), 7_200);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("P1DT1H"), 90_000);
    }

    #[test]
    fn duration_garbage_defaults_to_zero() {
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("not-a-duration"), 0);
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("not-a-number")), 0);
        assert_eq!(parse_count(Some("1234")), 1234);
    }

    #[tokio::test]
    async fn missing_api_key_is_not_configured() {
        let adapter = YoutubeDataApi::new(YoutubeConfig::new(None), &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(result, Err(SourceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn disabled_adapter_reports_disabled() {
        let mut config = YoutubeConfig::new(Some("key".to_string()));
        config.enabled = false;
        let adapter = YoutubeDataApi::new(config, &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(result, Err(SourceError::Disabled(_))));
    }

    #[tokio::test]
    async fn search_maps_statistics_and_duration() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "coffee brewing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "id": { "videoId": "abc123" } },
                    { "id": { "videoId": "def456" } }
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "abc123,def456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "abc123",
                        "snippet": {
                            "title": "Pour-over basics",
                            "description": "Grind size matters",
                            "publishedAt": "2026-01-15T10:00:00Z",
                            "thumbnails": { "high": { "url": "https://img.example/abc.jpg" } }
                        },
                        "statistics": {
                            "viewCount": "200000",
                            "likeCount": "100",
                            "commentCount": "50"
                        },
                        "contentDetails": { "duration": "PT1M30S" }
                    },
                    {
                        "id": "def456",
                        "snippet": { "title": "Cold brew", "publishedAt": null },
                        "statistics": {},
                        "contentDetails": { "duration": "PT45S" }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let config = YoutubeConfig::new(Some("key".to_string())).with_base_url(&server.uri());
        let adapter = YoutubeDataApi::new(config, &settings()).unwrap();
        let records = adapter.search(&query()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_id, "abc123");
        assert_eq!(records[0].platform, Platform::Youtube);
        assert_eq!(records[0].views, 200_000);
        assert_eq!(records[0].comments, 50);
        assert_eq!(records[0].duration_secs, 90);
        assert_eq!(records[0].url, "https://www.youtube.com/watch?v=abc123");
        // Omitted statistics default to 0, never null.
        assert_eq!(records[1].views, 0);
        assert_eq!(records[1].likes, 0);
    }

    #[tokio::test]
    async fn empty_search_returns_empty_without_videos_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })),
            )
            .mount(&server)
            .await;

        let config = YoutubeConfig::new(Some("key".to_string())).with_base_url(&server.uri());
        let adapter = YoutubeDataApi::new(config, &settings()).unwrap();
        let records = adapter.search(&query()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn non_2xx_is_upstream_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let config = YoutubeConfig::new(Some("key".to_string())).with_base_url(&server.uri());
        let adapter = YoutubeDataApi::new(config, &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(
            result,
            Err(SourceError::UpstreamRejected { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_deserialize_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let config = YoutubeConfig::new(Some("key".to_string())).with_base_url(&server.uri());
        let adapter = YoutubeDataApi::new(config, &settings()).unwrap();
        let result = adapter.search(&query()).await;
        assert!(matches!(result, Err(SourceError::Deserialize { .. })));
    }
}
