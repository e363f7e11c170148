//! Wiring from application config to per-platform adapter chains.

use std::collections::BTreeMap;
use std::time::Duration;

use clipscout_core::{AppConfig, Platform};

use crate::adapter::SourceAdapter;
use crate::adapters::{
    FixtureAdapter, InstagramConfig, InstagramGraphApi, InvidiousConfig, InvidiousSearch,
    TiktokConfig, TiktokResearchApi, TiktokScraperConfig, TiktokScraperService, YoutubeConfig,
    YoutubeDataApi,
};
use crate::error::SourceError;

/// Shared HTTP client settings for every outbound adapter.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.source_timeout_secs,
            user_agent: config.source_user_agent.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be constructed.
    pub fn build_client(&self) -> Result<reqwest::Client, SourceError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?)
    }
}

/// Builds the adapter chain for every platform, in priority order.
///
/// Fixture mode replaces every chain with the in-process fixture adapter.
/// A platform listed in `disabled_platforms` keeps its chain but each
/// adapter is constructed disabled, so runs report it as skipped rather
/// than silently absent.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if an HTTP client cannot be built.
pub fn build_platform_chains(
    config: &AppConfig,
) -> Result<BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>>, SourceError> {
    let mut chains: BTreeMap<Platform, Vec<Box<dyn SourceAdapter>>> = BTreeMap::new();

    if config.use_fixture_sources {
        for platform in Platform::ALL {
            if config.disabled_platforms.contains(&platform) {
                continue;
            }
            chains.insert(platform, vec![Box::new(FixtureAdapter::new(platform))]);
        }
        return Ok(chains);
    }

    let http = HttpSettings::from_app_config(config);

    let enabled = |platform: Platform| !config.disabled_platforms.contains(&platform);

    let mut youtube_api = YoutubeConfig::new(config.youtube_api_key.clone());
    youtube_api.enabled = enabled(Platform::Youtube);
    let mut invidious = InvidiousConfig::new(config.invidious_base_url.clone());
    invidious.enabled = enabled(Platform::Youtube);
    chains.insert(
        Platform::Youtube,
        vec![
            Box::new(YoutubeDataApi::new(youtube_api, &http)?),
            Box::new(InvidiousSearch::new(invidious, &http)?),
        ],
    );

    let mut tiktok_api = TiktokConfig::new(config.tiktok_access_token.clone());
    tiktok_api.enabled = enabled(Platform::Tiktok);
    let mut tiktok_scraper = TiktokScraperConfig::new(config.tiktok_scraper_url.clone());
    tiktok_scraper.enabled = enabled(Platform::Tiktok);
    chains.insert(
        Platform::Tiktok,
        vec![
            Box::new(TiktokResearchApi::new(tiktok_api, &http)?),
            Box::new(TiktokScraperService::new(tiktok_scraper, &http)?),
        ],
    );

    let mut instagram = InstagramConfig::new(
        config.instagram_access_token.clone(),
        config.instagram_user_id.clone(),
    );
    instagram.enabled = enabled(Platform::Instagram);
    chains.insert(
        Platform::Instagram,
        vec![Box::new(InstagramGraphApi::new(instagram, &http)?)],
    );

    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::for_tests()
    }

    #[test]
    fn fixture_mode_builds_one_fixture_per_platform() {
        let mut config = base_config();
        config.use_fixture_sources = true;
        let chains = build_platform_chains(&config).unwrap();
        assert_eq!(chains.len(), 3);
        for chain in chains.values() {
            assert_eq!(chain.len(), 1);
            assert!(chain[0].name().starts_with("fixture_"));
        }
    }

    #[test]
    fn fixture_mode_omits_disabled_platforms() {
        let mut config = base_config();
        config.use_fixture_sources = true;
        config.disabled_platforms = vec![Platform::Instagram];
        let chains = build_platform_chains(&config).unwrap();
        assert!(!chains.contains_key(&Platform::Instagram));
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn live_mode_builds_priority_ordered_chains() {
        let config = base_config();
        let chains = build_platform_chains(&config).unwrap();

        let youtube: Vec<&str> = chains[&Platform::Youtube].iter().map(|a| a.name()).collect();
        assert_eq!(youtube, vec!["youtube_data_api", "invidious_search"]);

        let tiktok: Vec<&str> = chains[&Platform::Tiktok].iter().map(|a| a.name()).collect();
        assert_eq!(tiktok, vec!["tiktok_research_api", "tiktok_scraper_service"]);

        let instagram: Vec<&str> =
            chains[&Platform::Instagram].iter().map(|a| a.name()).collect();
        assert_eq!(instagram, vec!["instagram_graph_api"]);
    }
}
