//! Language-model client for enrichment and script generation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use clipscout_core::VideoRecord;

use crate::types::VideoAnalysis;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation client is not configured (missing API key)")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl GenerationConfig {
    #[must_use]
    pub fn new(api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            timeout_secs,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

pub struct GenerationClient {
    config: GenerationConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl GenerationClient {
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Sends one prompt and returns the first text block of the reply.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without an API key; `Api` on a non-2xx status;
    /// `MalformedResponse` when the reply carries no text content.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GenerationError::NotConfigured);
        };

        let url = format!("{}/messages", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                detail: text,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        let reply = parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if reply.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "reply carried no text content".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Model replies often wrap JSON in a fenced code block; unwrap it.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

/// The enrichment seam: anything that can analyze one video's content.
#[async_trait]
pub trait VideoAnalyzer: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn analyze(&self, video: &VideoRecord) -> Result<VideoAnalysis, GenerationError>;
}

fn analysis_prompt(video: &VideoRecord) -> String {
    format!(
        "Analyze this short-form video listing and respond with JSON only, \
         no prose, using keys transcript, translated_transcript, keywords \
         (array), detected_language (BCP-47 tag), success_factors (array).\n\
         Title: {}\nDescription: {}\nPlatform: {}\nViews: {}\nLikes: {}\n\
         Comments: {}\nDuration seconds: {}",
        video.title,
        video.description,
        video.platform,
        video.views,
        video.likes,
        video.comments,
        video.duration_secs
    )
}

#[async_trait]
impl VideoAnalyzer for GenerationClient {
    fn is_configured(&self) -> bool {
        GenerationClient::is_configured(self)
    }

    async fn analyze(&self, video: &VideoRecord) -> Result<VideoAnalysis, GenerationError> {
        let reply = self.complete(&analysis_prompt(video), 2_048).await?;
        let payload = strip_code_fences(&reply);
        serde_json::from_str(payload)
            .map_err(|e| GenerationError::MalformedResponse(format!("analysis JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use clipscout_core::Platform;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer, api_key: Option<&str>) -> GenerationClient {
        let config = GenerationConfig::new(api_key.map(String::from), "test-model", 5)
            .with_base_url(&server.uri());
        GenerationClient::new(config).unwrap()
    }

    fn video() -> VideoRecord {
        VideoRecord {
            source_id: "v1".to_string(),
            platform: Platform::Tiktok,
            title: "Latte art basics".to_string(),
            description: "Pouring hearts".to_string(),
            url: "https://example.com/v1".to_string(),
            thumbnail_url: String::new(),
            views: 10_000,
            likes: 900,
            comments: 40,
            duration_secs: 30,
            published_at: None,
        }
    }

    #[test]
    fn strips_json_code_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let server = MockServer::start().await;
        let result = client(&server, None).complete("hello", 64).await;
        assert!(matches!(result, Err(GenerationError::NotConfigured)));
    }

    #[tokio::test]
    async fn complete_sends_headers_and_joins_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "secret-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "first " }, { "type": "text", "text": "second" }]
            })))
            .mount(&server)
            .await;

        let reply = client(&server, Some("secret-key"))
            .complete("hello", 64)
            .await
            .unwrap();
        assert_eq!(reply, "first second");
    }

    #[tokio::test]
    async fn non_2xx_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let result = client(&server, Some("k")).complete("hello", 64).await;
        match result {
            Err(GenerationError::Api { status, detail }) => {
                assert_eq!(status, 429);
                assert!(detail.contains("rate limited"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn analyze_parses_fenced_json() {
        let server = MockServer::start().await;

        let analysis = serde_json::json!({
            "transcript": "pour the milk slowly",
            "translated_transcript": "pour the milk slowly",
            "keywords": ["latte", "art"],
            "detected_language": "en",
            "success_factors": ["strong visual hook"]
        });
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": format!("```json\n{analysis}\n```") }]
            })))
            .mount(&server)
            .await;

        let result = client(&server, Some("k")).analyze(&video()).await.unwrap();
        assert_eq!(result.detected_language, "en");
        assert_eq!(result.keywords, vec!["latte", "art"]);
    }

    #[tokio::test]
    async fn analyze_rejects_non_json_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "Sure! Here is my analysis in prose." }]
            })))
            .mount(&server)
            .await;

        let result = client(&server, Some("k")).analyze(&video()).await;
        assert!(matches!(result, Err(GenerationError::MalformedResponse(_))));
    }
}
