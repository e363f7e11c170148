//! Ranking, enrichment, and synthesis for discovered videos.
//!
//! Ranking and insight synthesis are pure functions. Enrichment talks to a
//! language model behind the [`VideoAnalyzer`] seam, strictly sequentially
//! and rate-limited, and degrades per item to a heuristic analysis rather
//! than dropping items.

pub mod enrich;
pub mod generation;
pub mod insights;
pub mod limiter;
pub mod ranking;
pub mod script;
pub mod types;

pub use enrich::{enrich_all, EnrichError, EnrichOptions};
pub use generation::{GenerationClient, GenerationConfig, GenerationError, VideoAnalyzer};
pub use insights::synthesize_insights;
pub use limiter::IntervalLimiter;
pub use ranking::{engagement_score, rank, select_top};
pub use script::{generate_script, ScriptDraft, ScriptStatus};
pub use types::{AnalysisOrigin, EnrichedItem, InsightSet, RankedItem, VideoAnalysis};
