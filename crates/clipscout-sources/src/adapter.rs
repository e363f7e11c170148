//! The source adapter contract.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use clipscout_core::VideoRecord;

use crate::error::SourceError;

/// Validated search parameters shared by every adapter.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    topic: String,
    max_results: u32,
    max_age_days: u32,
}

impl SearchQuery {
    /// Builds a query, rejecting empty topics and a zero result quota.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidQuery`] when `topic` is blank or
    /// `max_results` is zero.
    pub fn new(topic: &str, max_results: u32, max_age_days: u32) -> Result<Self, SourceError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SourceError::InvalidQuery("topic must not be empty".into()));
        }
        if max_results == 0 {
            return Err(SourceError::InvalidQuery(
                "max_results must be at least 1".into(),
            ));
        }
        Ok(Self {
            topic: topic.to_string(),
            max_results,
            max_age_days,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    #[must_use]
    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Oldest acceptable publish timestamp, or `None` when age is unbounded.
    #[must_use]
    pub fn published_after(&self) -> Option<DateTime<Utc>> {
        if self.max_age_days == 0 {
            return None;
        }
        Some(Utc::now() - Duration::days(i64::from(self.max_age_days)))
    }
}

/// One concrete integration path to a platform.
///
/// On success an adapter returns between 0 and `max_results` records with
/// all identity fields populated; numeric metrics the upstream omits are 0,
/// never null. Adapters perform exactly one outbound call sequence per
/// `search` and never retry internally.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable adapter name used in logs and platform status reports.
    fn name(&self) -> &'static str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>, SourceError>;
}
