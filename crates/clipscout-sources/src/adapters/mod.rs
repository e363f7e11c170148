//! Concrete platform integrations.

mod fixture;
mod instagram;
mod invidious;
mod tiktok;
mod tiktok_scraper;
mod youtube;

pub use fixture::FixtureAdapter;
pub use instagram::{InstagramConfig, InstagramGraphApi};
pub use invidious::{InvidiousConfig, InvidiousSearch};
pub use tiktok::{TiktokConfig, TiktokResearchApi};
pub use tiktok_scraper::{TiktokScraperConfig, TiktokScraperService};
pub use youtube::{YoutubeConfig, YoutubeDataApi};
