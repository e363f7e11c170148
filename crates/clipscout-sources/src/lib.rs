//! Video discovery sources for clipscout.
//!
//! One [`SourceAdapter`] per integration path to a platform; platforms with
//! multiple paths (official API plus a scraping-style fallback) are tried in
//! priority order by the fallback coordinator. The aggregator fans out to
//! all configured platforms concurrently and merges the survivors into one
//! deduplicated batch.

pub mod adapter;
pub mod aggregate;
pub mod chains;
pub mod error;
pub mod fallback;

mod adapters;

pub use adapter::{SearchQuery, SourceAdapter};
pub use adapters::{
    FixtureAdapter, InstagramConfig, InstagramGraphApi, InvidiousConfig, InvidiousSearch,
    TiktokConfig, TiktokResearchApi, TiktokScraperConfig, TiktokScraperService, YoutubeConfig,
    YoutubeDataApi,
};
pub use aggregate::{discover, DiscoveryReport, NoResultsError, PlatformOutcome};
pub use chains::{build_platform_chains, HttpSettings};
pub use error::SourceError;
pub use fallback::{run_fallback_chain, FallbackOutcome};
