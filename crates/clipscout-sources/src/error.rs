use thiserror::Error;

/// Failure modes for a single source adapter call.
///
/// `NotConfigured` and `Disabled` are deliberately distinct from upstream
/// failures: the fallback coordinator skips straight past them without
/// counting a failed attempt, while `Http`/`UpstreamRejected`/`Deserialize`
/// represent an adapter that was tried and failed. No adapter retries;
/// retry policy, if any, belongs to the caller.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0} is not configured (missing credentials)")]
    NotConfigured(String),

    #[error("{0} is disabled")]
    Disabled(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream rejected {context}: {detail}")]
    UpstreamRejected { context: String, detail: String },

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    #[error("no adapters configured for this platform")]
    NoAdaptersConfigured,
}

impl SourceError {
    /// `true` for "not set up" conditions the coordinator and aggregator
    /// report as a configuration skip rather than a failed attempt.
    #[must_use]
    pub fn is_configuration_skip(&self) -> bool {
        matches!(
            self,
            SourceError::NotConfigured(_)
                | SourceError::Disabled(_)
                | SourceError::NoAdaptersConfigured
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_is_a_configuration_skip() {
        assert!(SourceError::NotConfigured("youtube_data_api".to_string())
            .is_configuration_skip());
        assert!(SourceError::Disabled("tiktok_research_api".to_string()).is_configuration_skip());
        assert!(SourceError::NoAdaptersConfigured.is_configuration_skip());
    }

    #[test]
    fn upstream_rejection_is_not_a_configuration_skip() {
        let err = SourceError::UpstreamRejected {
            context: "search".to_string(),
            detail: "HTTP 500".to_string(),
        };
        assert!(!err.is_configuration_skip());
    }
}
