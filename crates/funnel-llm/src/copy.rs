use crate::client::ChatClient;
use crate::error::LlmError;
use crate::prompt;
use async_trait::async_trait;
use funnel_core::copy::CopyTone;
use funnel_core::persona::{Persona, PersonaDraft};
use funnel_core::stage::{Stage, StageMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Request body ─────────────────────────────────────────────────────────

/// Body accepted by the copy endpoint: `{ funnelContent, persona, tone }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    #[serde(default)]
    pub funnel_content: BTreeMap<Stage, Vec<CopyAsset>>,
    #[serde(default)]
    pub persona: Option<PersonaInput>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// The parts of a content asset the copy prompt uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyAsset {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Either a bare persona name or a full profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonaInput {
    Name(String),
    Profile(PersonaDraft),
}

impl PersonaInput {
    pub fn describe(&self) -> String {
        match self {
            PersonaInput::Name(name) => name.clone(),
            PersonaInput::Profile(p) => {
                let mut parts = vec![p.name.clone()];
                if !p.summary.is_empty() {
                    parts.push(p.summary.clone());
                }
                if !p.pain_points.is_empty() {
                    parts.push(format!("pain points: {}", p.pain_points.join("; ")));
                }
                if !p.goals.is_empty() {
                    parts.push(format!("goals: {}", p.goals.join("; ")));
                }
                parts.join(" | ")
            }
        }
    }
}

impl CopyRequest {
    pub fn new(stages: &StageMap, persona: Option<&Persona>, tone: CopyTone) -> Self {
        let funnel_content = stages
            .iter()
            .map(|(stage, bucket)| {
                let assets = bucket
                    .iter()
                    .map(|a| CopyAsset {
                        content_type: a.content_type.clone(),
                        name: a.name.clone(),
                        description: a.description.clone(),
                    })
                    .collect();
                (stage, assets)
            })
            .collect();
        let persona = persona.map(|p| {
            PersonaInput::Profile(PersonaDraft {
                name: p.name.clone(),
                summary: p.summary.clone(),
                demographics: p.demographics.clone(),
                pain_points: p.pain_points.clone(),
                goals: p.goals.clone(),
                behaviors: p.behaviors.clone(),
            })
        });
        Self {
            funnel_content,
            persona,
            tone: Some(tone.to_string()),
        }
    }

    pub fn total_items(&self) -> usize {
        self.funnel_content.values().map(Vec::len).sum()
    }
}

// ─── Writers ──────────────────────────────────────────────────────────────

/// Produces marketing copy for a request.
#[async_trait]
pub trait CopyWriter: Send + Sync {
    async fn write(&self, request: &CopyRequest) -> Result<String, LlmError>;
}

/// Copy written by a chat-completion model.
#[derive(Debug, Clone)]
pub struct LlmCopyWriter {
    client: ChatClient,
}

impl LlmCopyWriter {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CopyWriter for LlmCopyWriter {
    async fn write(&self, request: &CopyRequest) -> Result<String, LlmError> {
        let user = prompt::copy_prompt(request);
        tracing::info!(
            items = request.total_items(),
            model = self.client.model(),
            "generating copy"
        );
        self.client.complete(prompt::COPY_SYSTEM, &user).await
    }
}
