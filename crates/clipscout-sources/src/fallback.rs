//! Fallback coordination across one platform's adapters.
//!
//! Platforms grow multiple integration paths over time: a stable but
//! quota-limited official API and a scraping-style fallback. The chain
//! prefers the higher-priority adapter but must not hard-fail when it is
//! merely unconfigured.

use clipscout_core::VideoRecord;

use crate::adapter::{SearchQuery, SourceAdapter};
use crate::error::SourceError;

/// Result of a fallback chain run, recording which adapter served it.
#[derive(Debug)]
pub struct FallbackOutcome {
    pub items: Vec<VideoRecord>,
    pub served_by: &'static str,
}

/// Invokes `adapters` strictly in priority order.
///
/// - First success with at least one item wins; later adapters are never
///   attempted.
/// - `NotConfigured`/`Disabled` adapters are skipped silently; "not set
///   up" is not a failed attempt.
/// - An empty success is remembered and the next adapter is tried.
/// - When the chain is exhausted: the last real failure wins; otherwise a
///   remembered empty success is returned; otherwise every adapter was
///   skipped and [`SourceError::NoAdaptersConfigured`] is synthesized.
///
/// # Errors
///
/// Returns the last non-configuration [`SourceError`] encountered, or
/// [`SourceError::NoAdaptersConfigured`].
pub async fn run_fallback_chain(
    adapters: &[Box<dyn SourceAdapter>],
    query: &SearchQuery,
) -> Result<FallbackOutcome, SourceError> {
    let mut last_failure: Option<SourceError> = None;
    let mut empty_from: Option<&'static str> = None;

    for adapter in adapters {
        match adapter.search(query).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(
                    adapter = adapter.name(),
                    count = items.len(),
                    "adapter served results"
                );
                return Ok(FallbackOutcome {
                    items,
                    served_by: adapter.name(),
                });
            }
            Ok(_) => {
                tracing::debug!(adapter = adapter.name(), "adapter returned no matches");
                empty_from = Some(adapter.name());
            }
            Err(e) if e.is_configuration_skip() => {
                tracing::debug!(adapter = adapter.name(), reason = %e, "adapter skipped");
            }
            Err(e) => {
                tracing::warn!(adapter = adapter.name(), error = %e, "adapter attempt failed");
                last_failure = Some(e);
            }
        }
    }

    if let Some(failure) = last_failure {
        return Err(failure);
    }
    if let Some(served_by) = empty_from {
        return Ok(FallbackOutcome {
            items: Vec::new(),
            served_by,
        });
    }
    Err(SourceError::NoAdaptersConfigured)
}
