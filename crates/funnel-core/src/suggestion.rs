//! Transient suggestions and the batch state machine that holds them.
//!
//! A [`SuggestionBatch`] moves through `Idle -> Loading -> Ready | Errored`.
//! Every request hands out a [`RequestTicket`]; only the ticket of the
//! outstanding request may complete it, so a response arriving after
//! [`SuggestionBatch::dismiss`] (or after a newer request) is dropped instead
//! of being merged into a list the user has already moved on from.

use crate::content::AssetDraft;
use crate::error::{FunnelError, Result};
use crate::persona::PersonaDraft;
use crate::stage::{Gap, Stage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub item: SuggestionItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionItem {
    Persona(PersonaDraft),
    Content(ContentIdea),
}

/// Proposed content asset, optionally aimed straight at a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdea {
    #[serde(flatten)]
    pub asset: AssetDraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_stage: Option<Stage>,
}

impl Suggestion {
    pub fn persona(draft: PersonaDraft) -> Self {
        Self::from_item(SuggestionItem::Persona(draft))
    }

    pub fn content(asset: AssetDraft, target_stage: Option<Stage>) -> Self {
        Self::from_item(SuggestionItem::Content(ContentIdea {
            asset,
            target_stage,
        }))
    }

    fn from_item(item: SuggestionItem) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item,
            confidence: None,
            reasoning: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Display title regardless of kind.
    pub fn title(&self) -> &str {
        match &self.item {
            SuggestionItem::Persona(p) => &p.name,
            SuggestionItem::Content(c) => &c.asset.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum SuggestionTopic {
    Personas,
    Content,
    GapFill { gaps: Vec<Gap> },
}

/// Context handed to a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub topic: SuggestionTopic,
    /// Free-text description of the business.
    #[serde(default)]
    pub business: String,
    /// Names of personas already on file.
    #[serde(default)]
    pub personas: Vec<String>,
    /// Names of content already on file, so generators can avoid repeats.
    #[serde(default)]
    pub existing: Vec<String>,
    pub count: usize,
}

impl SuggestionRequest {
    pub fn new(topic: SuggestionTopic) -> Self {
        Self {
            topic,
            business: String::new(),
            personas: Vec::new(),
            existing: Vec::new(),
            count: 3,
        }
    }

    pub fn with_business(mut self, business: impl Into<String>) -> Self {
        self.business = business.into();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("suggestion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("suggestion service unavailable: {0}")]
    Unavailable(String),

    #[error("suggestion service failed: {0}")]
    Upstream(String),

    #[error("could not read suggestions: {0}")]
    Malformed(String),
}

/// Source of candidate personas and content: canned data or a language model.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &SuggestionRequest,
    ) -> std::result::Result<Vec<Suggestion>, GeneratorError>;
}

/// Run `generator` with an upper bound on how long the caller waits.
pub async fn fetch(
    generator: &dyn SuggestionGenerator,
    request: &SuggestionRequest,
    timeout: Duration,
) -> std::result::Result<Vec<Suggestion>, GeneratorError> {
    match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(?timeout, "suggestion request timed out");
            Err(GeneratorError::Timeout(timeout))
        }
    }
}

// ---------------------------------------------------------------------------
// SuggestionBatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    Loading,
    Ready,
    Errored(String),
}

impl BatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Idle => "idle",
            BatchPhase::Loading => "loading",
            BatchPhase::Ready => "ready",
            BatchPhase::Errored(_) => "errored",
        }
    }
}

/// Handle for one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    Replace,
    Append,
}

#[derive(Debug, Clone)]
pub struct SuggestionBatch {
    phase: BatchPhase,
    items: Vec<Suggestion>,
    epoch: u64,
    pending: Option<(RequestTicket, MergeMode)>,
}

impl Default for SuggestionBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionBatch {
    pub fn new() -> Self {
        Self {
            phase: BatchPhase::Idle,
            items: Vec::new(),
            epoch: 0,
            pending: None,
        }
    }

    pub fn phase(&self) -> &BatchPhase {
        &self.phase
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.phase == BatchPhase::Loading
    }

    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Start a fresh request whose result replaces the list.
    /// Returns `None` while another request is outstanding.
    pub fn request(&mut self) -> Option<RequestTicket> {
        self.begin(MergeMode::Replace)
    }

    /// Ask for more suggestions, appended to the current list. Only valid
    /// from `Ready` or `Errored`.
    pub fn request_more(&mut self) -> Option<RequestTicket> {
        match self.phase {
            BatchPhase::Ready | BatchPhase::Errored(_) => self.begin(MergeMode::Append),
            BatchPhase::Idle | BatchPhase::Loading => None,
        }
    }

    fn begin(&mut self, mode: MergeMode) -> Option<RequestTicket> {
        if self.is_loading() {
            tracing::debug!("suggestion request ignored: already loading");
            return None;
        }
        self.epoch += 1;
        let ticket = RequestTicket(self.epoch);
        self.pending = Some((ticket, mode));
        self.phase = BatchPhase::Loading;
        Some(ticket)
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` when the ticket is stale (dismissed or superseded), in
    /// which case nothing changes.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: std::result::Result<Vec<Suggestion>, GeneratorError>,
    ) -> bool {
        let mode = match self.pending {
            Some((current, mode)) if current == ticket => mode,
            _ => {
                tracing::debug!(?ticket, "discarding stale suggestion response");
                return false;
            }
        };
        self.pending = None;
        match result {
            Ok(incoming) => {
                if mode == MergeMode::Replace {
                    self.items.clear();
                }
                for s in incoming {
                    if self.get(&s.id).is_none() {
                        self.items.push(s);
                    }
                }
                self.phase = BatchPhase::Ready;
            }
            Err(e) => {
                tracing::warn!(error = %e, "suggestion request failed");
                self.phase = BatchPhase::Errored(e.to_string());
            }
        }
        true
    }

    /// Look up a suggestion that can be accepted right now. Acceptance is
    /// only open while the batch is `Ready`.
    pub fn ready(&self, id: &str) -> Result<&Suggestion> {
        if self.phase != BatchPhase::Ready {
            return Err(FunnelError::validation(
                "suggestion",
                format!("cannot accept while suggestions are {}", self.phase.as_str()),
            ));
        }
        self.get(id)
            .ok_or_else(|| FunnelError::SuggestionNotFound(id.to_string()))
    }

    /// Remove a suggestion so it cannot be accepted twice.
    pub fn take(&mut self, id: &str) -> Result<Suggestion> {
        self.ready(id)?;
        let pos = self
            .items
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| FunnelError::SuggestionNotFound(id.to_string()))?;
        Ok(self.items.remove(pos))
    }

    /// Close the batch, dropping unaccepted suggestions and invalidating any
    /// outstanding ticket.
    pub fn dismiss(&mut self) {
        self.items.clear();
        self.pending = None;
        self.phase = BatchPhase::Idle;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ideas(names: &[&str]) -> Vec<Suggestion> {
        names
            .iter()
            .map(|n| Suggestion::content(AssetDraft::new("Blog Post", *n), None))
            .collect()
    }

    struct Slow;

    #[async_trait]
    impl SuggestionGenerator for Slow {
        async fn generate(
            &self,
            _request: &SuggestionRequest,
        ) -> std::result::Result<Vec<Suggestion>, GeneratorError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn request_while_loading_is_noop() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        assert!(batch.is_loading());
        assert!(batch.request().is_none());
        assert!(batch.request_more().is_none());
        assert!(batch.complete(t, Ok(ideas(&["a"]))));
        assert_eq!(batch.phase(), &BatchPhase::Ready);
    }

    #[test]
    fn request_more_appends() {
        let mut batch = SuggestionBatch::new();
        assert!(batch.request_more().is_none(), "not valid from idle");
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["a", "b"])));
        let t = batch.request_more().unwrap();
        batch.complete(t, Ok(ideas(&["c"])));
        let titles: Vec<_> = batch.items().iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn fresh_request_replaces() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["a", "b"])));
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["z"])));
        assert_eq!(batch.items().len(), 1);
        assert_eq!(batch.items()[0].title(), "z");
    }

    #[test]
    fn error_keeps_list_and_allows_more() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["a"])));
        let t = batch.request_more().unwrap();
        batch.complete(t, Err(GeneratorError::Upstream("502".into())));
        match batch.phase() {
            BatchPhase::Errored(msg) => assert!(!msg.is_empty()),
            other => panic!("expected errored, got {other:?}"),
        }
        assert_eq!(batch.items().len(), 1);
        let t = batch.request_more().unwrap();
        batch.complete(t, Ok(ideas(&["b"])));
        assert_eq!(batch.items().len(), 2);
    }

    #[test]
    fn take_is_at_most_once() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["a", "b"])));
        let id = batch.items()[0].id.clone();
        let taken = batch.take(&id).unwrap();
        assert_eq!(taken.title(), "a");
        assert!(matches!(batch.take(&id), Err(FunnelError::SuggestionNotFound(_))));
        assert_eq!(batch.phase(), &BatchPhase::Ready);
        assert_eq!(batch.items().len(), 1);
    }

    #[test]
    fn take_requires_ready_batch() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        batch.complete(t, Ok(ideas(&["a"])));
        let id = batch.items()[0].id.clone();

        let t = batch.request_more().unwrap();
        assert!(matches!(batch.take(&id), Err(FunnelError::Validation { .. })));
        batch.complete(t, Err(GeneratorError::Timeout(Duration::from_secs(1))));
        assert!(matches!(batch.take(&id), Err(FunnelError::Validation { .. })));
        assert!(batch.ready(&id).is_err());
        assert_eq!(batch.items().len(), 1, "nothing removed outside Ready");
    }

    #[test]
    fn dismissed_batch_ignores_late_response() {
        let mut batch = SuggestionBatch::new();
        let t = batch.request().unwrap();
        batch.dismiss();
        assert!(!batch.complete(t, Ok(ideas(&["late"]))));
        assert_eq!(batch.phase(), &BatchPhase::Idle);
        assert!(batch.items().is_empty());
    }

    #[test]
    fn superseded_ticket_is_stale() {
        let mut batch = SuggestionBatch::new();
        let first = batch.request().unwrap();
        batch.dismiss();
        let second = batch.request().unwrap();
        assert!(!batch.complete(first, Ok(ideas(&["old"]))));
        assert!(batch.is_loading());
        assert!(batch.complete(second, Ok(ideas(&["new"]))));
        assert_eq!(batch.items()[0].title(), "new");
    }

    #[test]
    fn suggestion_serializes_with_kind_tag() {
        let s = Suggestion::content(AssetDraft::new("Case Study", "Acme"), Some(Stage::Trust))
            .with_confidence(1.7);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["item"]["kind"], "content");
        assert_eq!(json["item"]["type"], "Case Study");
        assert_eq!(json["item"]["targetStage"], "trust");
        assert_eq!(s.confidence, Some(1.0));
    }

    #[tokio::test]
    async fn fetch_times_out() {
        let request = SuggestionRequest::new(SuggestionTopic::Personas);
        let err = fetch(&Slow, &request, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Timeout(_)));
    }
}
