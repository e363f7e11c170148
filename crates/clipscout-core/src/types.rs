//! Core domain types shared across the discovery pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One external content platform queried for candidate videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    /// All platforms the aggregator knows how to query, in merge order.
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Tiktok, Platform::Instagram];
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Platform::Youtube),
            "tiktok" => Ok(Platform::Tiktok),
            "instagram" => Ok(Platform::Instagram),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// A normalized video discovered on one platform.
///
/// Identity is the `(source_id, platform)` pair, unique within one
/// aggregation batch. Numeric metrics default to 0 when the upstream
/// source omits them; they are never null. Records are immutable once
/// produced by an adapter; ranking and enrichment wrap them in derived
/// types rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform-native video identifier.
    pub source_id: String,
    pub platform: Platform,
    pub title: String,
    pub description: String,
    /// Canonical watch URL.
    pub url: String,
    pub thumbnail_url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub duration_secs: u32,
    pub published_at: Option<DateTime<Utc>>,
}
