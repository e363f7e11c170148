//! Analysis-stage data shapes.

use serde::Serialize;

use clipscout_core::VideoRecord;

/// A discovered video with its computed engagement standing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedItem {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub engagement_score: f64,
    pub is_viral: bool,
}

/// Content-level analysis of one video, from the model or the heuristic.
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct VideoAnalysis {
    pub transcript: String,
    pub translated_transcript: String,
    pub keywords: Vec<String>,
    /// BCP-47 language tag; `und` when undetermined.
    pub detected_language: String,
    pub success_factors: Vec<String>,
}

/// Where an item's analysis came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOrigin {
    Model,
    Heuristic,
}

/// A ranked item plus its analysis. Enrichment emits exactly one of these
/// per input item, whatever happened to the model call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: RankedItem,
    pub analysis: VideoAnalysis,
    pub origin: AnalysisOrigin,
}

/// Aggregate insights synthesized from an enriched batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InsightSet {
    /// Most frequent keywords across the batch, most common first.
    pub themes: Vec<String>,
    /// Distinct success factors drawn from the viral subset.
    pub viral_patterns: Vec<String>,
    pub recommended_style: String,
    pub target_duration_secs: u32,
    /// Topic-seeded phrases for prompt building, one per top theme.
    pub key_phrases: Vec<String>,
}
