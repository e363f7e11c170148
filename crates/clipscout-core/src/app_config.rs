use std::net::SocketAddr;

use crate::types::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Accepted bearer tokens for the HTTP API; empty means auth is off in
    /// development and a startup error everywhere else.
    pub api_keys: Vec<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Per-call timeout applied to every outbound source adapter request.
    pub source_timeout_secs: u64,
    pub source_user_agent: String,
    /// Item quota requested from each platform per discovery run.
    pub per_platform_results: u32,
    /// Discard videos older than this many days at the source.
    pub max_age_days: u32,
    /// Serve canned fixture results instead of calling real platforms.
    pub use_fixture_sources: bool,
    /// Platforms intentionally turned off; their adapters report `Disabled`.
    pub disabled_platforms: Vec<Platform>,
    pub youtube_api_key: Option<String>,
    pub invidious_base_url: Option<String>,
    pub tiktok_access_token: Option<String>,
    pub tiktok_scraper_url: Option<String>,
    pub instagram_access_token: Option<String>,
    pub instagram_user_id: Option<String>,
    pub generation_api_key: Option<String>,
    pub generation_model: String,
    pub generation_timeout_secs: u64,
    /// Fixed pause between sequential enrichment calls (rate-limit discipline).
    pub enrich_interval_ms: u64,
    /// How many top-ranked items are sent for enrichment.
    pub enrich_top_k: usize,
    /// Overall enrichment deadline; 0 disables the deadline.
    pub enrich_deadline_secs: u64,
}

impl AppConfig {
    /// Baseline configuration for tests in this workspace.
    ///
    /// Not wired to any real service; override fields as needed.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/clipscout_test".to_string(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap_or_else(|_| unreachable!()),
            log_level: "debug".to_string(),
            api_keys: vec!["test-api-key".to_string()],
            rate_limit_max_requests: 120,
            rate_limit_window_secs: 60,
            db_max_connections: 2,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            source_timeout_secs: 5,
            source_user_agent: "clipscout-test/0.1".to_string(),
            per_platform_results: 5,
            max_age_days: 30,
            use_fixture_sources: false,
            disabled_platforms: Vec::new(),
            youtube_api_key: Some("test-youtube-key".to_string()),
            invidious_base_url: Some("http://127.0.0.1:1".to_string()),
            tiktok_access_token: Some("test-tiktok-token".to_string()),
            tiktok_scraper_url: Some("http://127.0.0.1:1".to_string()),
            instagram_access_token: Some("test-instagram-token".to_string()),
            instagram_user_id: Some("1789".to_string()),
            generation_api_key: Some("test-generation-key".to_string()),
            generation_model: "claude-3-5-sonnet-latest".to_string(),
            generation_timeout_secs: 5,
            enrich_interval_ms: 0,
            enrich_top_k: 5,
            enrich_deadline_secs: 0,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("source_user_agent", &self.source_user_agent)
            .field("per_platform_results", &self.per_platform_results)
            .field("max_age_days", &self.max_age_days)
            .field("use_fixture_sources", &self.use_fixture_sources)
            .field("disabled_platforms", &self.disabled_platforms)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("invidious_base_url", &self.invidious_base_url)
            .field(
                "tiktok_access_token",
                &self.tiktok_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("tiktok_scraper_url", &self.tiktok_scraper_url)
            .field(
                "instagram_access_token",
                &self.instagram_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("instagram_user_id", &self.instagram_user_id)
            .field(
                "generation_api_key",
                &self.generation_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("generation_model", &self.generation_model)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .field("enrich_interval_ms", &self.enrich_interval_ms)
            .field("enrich_top_k", &self.enrich_top_k)
            .field("enrich_deadline_secs", &self.enrich_deadline_secs)
            .finish()
    }
}
