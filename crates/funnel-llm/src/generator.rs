use crate::client::ChatClient;
use crate::error::LlmError;
use crate::prompt;
use async_trait::async_trait;
use funnel_core::content::AssetDraft;
use funnel_core::persona::{Demographics, PersonaDraft};
use funnel_core::stage::Stage;
use funnel_core::suggestion::{
    GeneratorError, Suggestion, SuggestionGenerator, SuggestionRequest, SuggestionTopic,
};
use serde::Deserialize;
use serde_json::Value;

/// Suggestions from a chat-completion model.
#[derive(Debug, Clone)]
pub struct LlmSuggestionGenerator {
    client: ChatClient,
}

impl LlmSuggestionGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SuggestionGenerator for LlmSuggestionGenerator {
    async fn generate(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<Suggestion>, GeneratorError> {
        let user = prompt::suggestion_prompt(request);
        let text = self.client.complete(prompt::SUGGEST_SYSTEM, &user).await?;
        let suggestions = parse_suggestions(&text, &request.topic)?;
        tracing::info!(count = suggestions.len(), "model suggestions parsed");
        Ok(suggestions)
    }
}

// ─── Parsing ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPersona {
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    demographics: Demographics,
    #[serde(default)]
    pain_points: Vec<String>,
    #[serde(default)]
    goals: Vec<String>,
    #[serde(default)]
    behaviors: Vec<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    #[serde(rename = "type", default)]
    content_type: String,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "stage")]
    target_stage: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (`json`, etc.) on the opening line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Locate the outermost JSON array in model output.
fn extract_array(text: &str) -> Option<&str> {
    let text = strip_fences(text);
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn finish(s: Suggestion, confidence: Option<f32>, reasoning: Option<String>) -> Suggestion {
    let s = match confidence {
        Some(c) => s.with_confidence(c),
        None => s,
    };
    match reasoning.filter(|r| !r.trim().is_empty()) {
        Some(r) => s.with_reasoning(r.trim()),
        None => s,
    }
}

fn persona_entry(value: Value) -> Option<Suggestion> {
    let raw: RawPersona = serde_json::from_value(value).ok()?;
    let draft = PersonaDraft {
        name: raw.name,
        summary: raw.summary,
        demographics: raw.demographics,
        pain_points: raw.pain_points,
        goals: raw.goals,
        behaviors: raw.behaviors,
    }
    .validated()
    .ok()?;
    Some(finish(Suggestion::persona(draft), raw.confidence, raw.reasoning))
}

fn content_entry(value: Value, gap_stages: Option<&[Stage]>) -> Option<Suggestion> {
    let raw: RawContent = serde_json::from_value(value).ok()?;
    let content_type = if raw.content_type.trim().is_empty() {
        "Blog Post".to_string()
    } else {
        raw.content_type
    };
    let asset = AssetDraft::new(content_type, raw.name)
        .with_description(raw.description)
        .validated()
        .ok()?;
    let target = match gap_stages {
        None => None,
        Some(stages) => {
            let parsed = raw.target_stage.and_then(|s| s.parse::<Stage>().ok());
            match parsed {
                Some(stage) if stages.contains(&stage) => Some(stage),
                // A single gap leaves no doubt about where the piece belongs.
                _ if stages.len() == 1 => Some(stages[0]),
                _ => return None,
            }
        }
    };
    Some(finish(
        Suggestion::content(asset, target),
        raw.confidence,
        raw.reasoning,
    ))
}

/// Turn raw model text into suggestions for `topic`.
///
/// Entries that do not validate are skipped. The call fails only when the
/// text holds no JSON array, or when every entry was unusable.
pub(crate) fn parse_suggestions(
    text: &str,
    topic: &SuggestionTopic,
) -> Result<Vec<Suggestion>, LlmError> {
    let array = extract_array(text)
        .ok_or_else(|| LlmError::Parse("model reply contained no JSON array".into()))?;
    let entries: Vec<Value> =
        serde_json::from_str(array).map_err(|e| LlmError::Parse(e.to_string()))?;
    let total = entries.len();

    let gap_stages: Option<Vec<Stage>> = match topic {
        SuggestionTopic::GapFill { gaps } => Some(gaps.iter().map(|g| g.stage).collect()),
        _ => None,
    };
    let out: Vec<Suggestion> = entries
        .into_iter()
        .filter_map(|entry| match topic {
            SuggestionTopic::Personas => persona_entry(entry),
            SuggestionTopic::Content | SuggestionTopic::GapFill { .. } => {
                content_entry(entry, gap_stages.as_deref())
            }
        })
        .collect();

    if total > 0 && out.is_empty() {
        return Err(LlmError::Parse(format!(
            "none of the {total} suggestions were usable"
        )));
    }
    if out.len() < total {
        tracing::debug!(dropped = total - out.len(), "skipped invalid suggestions");
    }
    Ok(out)
}
