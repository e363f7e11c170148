//! Script drafting from synthesized insights.
//!
//! The model writes the draft when it can; otherwise a structured template
//! built from the insights stands in, flagged so callers can tell the two
//! apart.

use serde::Serialize;

use crate::generation::GenerationClient;
use crate::types::{EnrichedItem, InsightSet};

const SCRIPT_MAX_TOKENS: u32 = 4_096;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStatus {
    Draft,
    DraftFallback,
}

impl ScriptStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptStatus::Draft => "draft",
            ScriptStatus::DraftFallback => "draft_fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptDraft {
    pub content: String,
    pub status: ScriptStatus,
}

#[must_use]
pub fn build_script_prompt(topic: &str, insights: &InsightSet, items: &[EnrichedItem]) -> String {
    let mut prompt = format!(
        "Write a short-form video script about \"{topic}\".\n\
         Target length: about {} seconds of speech.\n\
         Style: {}.\n",
        insights.target_duration_secs, insights.recommended_style
    );
    if !insights.themes.is_empty() {
        prompt.push_str(&format!("Themes to weave in: {}.\n", insights.themes.join(", ")));
    }
    if !insights.key_phrases.is_empty() {
        prompt.push_str(&format!(
            "Phrases to echo: {}.\n",
            insights.key_phrases.join("; ")
        ));
    }
    if !insights.viral_patterns.is_empty() {
        prompt.push_str(&format!(
            "Patterns that worked for similar videos: {}.\n",
            insights.viral_patterns.join("; ")
        ));
    }
    prompt.push_str("Top performing references:\n");
    for enriched in items.iter().take(5) {
        prompt.push_str(&format!(
            "- {} ({} views, engagement {:.1})\n",
            enriched.item.video.title, enriched.item.video.views, enriched.item.engagement_score
        ));
    }
    prompt.push_str(
        "Structure the script as HOOK, BODY, and CALL TO ACTION sections. \
         Return only the script text.",
    );
    prompt
}

/// Template draft used when the model is unavailable.
#[must_use]
pub fn fallback_script(topic: &str, insights: &InsightSet) -> String {
    let themes = if insights.themes.is_empty() {
        topic.to_string()
    } else {
        insights.themes.join(", ")
    };
    let patterns = if insights.viral_patterns.is_empty() {
        "clear value delivered early".to_string()
    } else {
        insights.viral_patterns.join("; ")
    };
    format!(
        "HOOK\nOpen on the most surprising fact about {topic} in the first \
         three seconds.\n\nBODY\nCover: {themes}. Lean on what worked for \
         similar videos: {patterns}. Keep the pace {} and aim for roughly \
         {} seconds total.\n\nCALL TO ACTION\nAsk viewers to share their \
         own take on {topic} and follow for the next one.",
        insights.recommended_style, insights.target_duration_secs
    )
}

/// Drafts a script, degrading to the template on any model problem.
pub async fn generate_script(
    client: Option<&GenerationClient>,
    topic: &str,
    insights: &InsightSet,
    items: &[EnrichedItem],
) -> ScriptDraft {
    if let Some(client) = client.filter(|c| c.is_configured()) {
        let prompt = build_script_prompt(topic, insights, items);
        match client.complete(&prompt, SCRIPT_MAX_TOKENS).await {
            Ok(content) => {
                return ScriptDraft {
                    content,
                    status: ScriptStatus::Draft,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "script generation failed, using template");
            }
        }
    }
    ScriptDraft {
        content: fallback_script(topic, insights),
        status: ScriptStatus::DraftFallback,
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::generation::GenerationConfig;

    use super::*;

    fn insights() -> InsightSet {
        InsightSet {
            themes: vec!["espresso".to_string(), "grind".to_string()],
            viral_patterns: vec!["strong hook".to_string()],
            recommended_style: "fast-paced, hook-driven".to_string(),
            target_duration_secs: 35,
            key_phrases: vec![
                "coffee brewing espresso".to_string(),
                "coffee brewing grind".to_string(),
            ],
        }
    }

    #[test]
    fn prompt_carries_insights_and_topic() {
        let prompt = build_script_prompt("coffee brewing", &insights(), &[]);
        assert!(prompt.contains("coffee brewing"));
        assert!(prompt.contains("35 seconds"));
        assert!(prompt.contains("espresso, grind"));
        assert!(prompt.contains("coffee brewing espresso"));
        assert!(prompt.contains("strong hook"));
    }

    #[test]
    fn fallback_has_all_three_sections() {
        let script = fallback_script("coffee brewing", &insights());
        assert!(script.contains("HOOK"));
        assert!(script.contains("BODY"));
        assert!(script.contains("CALL TO ACTION"));
        assert!(script.contains("coffee brewing"));
    }

    #[tokio::test]
    async fn no_client_yields_fallback_draft() {
        let draft = generate_script(None, "coffee brewing", &insights(), &[]).await;
        assert_eq!(draft.status, ScriptStatus::DraftFallback);
        assert!(draft.content.contains("HOOK"));
    }

    #[tokio::test]
    async fn model_reply_becomes_the_draft() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "HOOK: did you know..." }]
            })))
            .mount(&server)
            .await;

        let config = GenerationConfig::new(Some("k".to_string()), "test-model", 5)
            .with_base_url(&server.uri());
        let client = GenerationClient::new(config).unwrap();

        let draft = generate_script(Some(&client), "coffee brewing", &insights(), &[]).await;
        assert_eq!(draft.status, ScriptStatus::Draft);
        assert_eq!(draft.content, "HOOK: did you know...");
    }

    #[tokio::test]
    async fn model_failure_degrades_to_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = GenerationConfig::new(Some("k".to_string()), "test-model", 5)
            .with_base_url(&server.uri());
        let client = GenerationClient::new(config).unwrap();

        let draft = generate_script(Some(&client), "coffee brewing", &insights(), &[]).await;
        assert_eq!(draft.status, ScriptStatus::DraftFallback);
    }
}
