//! The funnel repository: personas, the content library and the stage map,
//! persisted through a [`KvStore`].
//!
//! Every mutation is staged on a copy of the state, written to the store,
//! and swapped in only after the write succeeds. A failed write leaves both
//! the in-memory state and the store as they were before the call.

use crate::content::{AssetDraft, AssetOrigin, AssetPatch, ContentAsset};
use crate::error::{FunnelError, Result};
use crate::paths::{ALL_KEYS, COPY_KEY, FUNNEL_KEY, LIBRARY_KEY, PERSONAS_KEY};
use crate::persona::{Persona, PersonaDraft, PersonaPatch, PersonaSource};
use crate::stage::{Gap, Stage, StageCounts, StageMap};
use crate::store::KvStore;
use crate::suggestion::{SuggestionBatch, SuggestionItem, SuggestionRequest, SuggestionTopic};
use crate::wizard::Progress;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// FunnelState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelState {
    pub personas: Vec<Persona>,
    pub content_library: Vec<ContentAsset>,
    pub funnel_content: StageMap,
    pub marketing_copy: String,
}

impl FunnelState {
    fn encode(&self, key: &str) -> Result<String> {
        Ok(match key {
            PERSONAS_KEY => serde_json::to_string(&self.personas)?,
            LIBRARY_KEY => serde_json::to_string(&self.content_library)?,
            FUNNEL_KEY => serde_json::to_string(&self.funnel_content)?,
            COPY_KEY => self.marketing_copy.clone(),
            other => return Err(FunnelError::Storage(format!("unknown store key '{other}'"))),
        })
    }

    /// Drop any asset id seen more than once. Stages are scanned in funnel
    /// order before the library, and the first occurrence wins.
    fn dedupe_assets(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        for stage in Stage::ALL {
            let bucket = self.funnel_content.get_mut(stage);
            let before = bucket.len();
            bucket.retain(|a| seen.insert(a.id.clone()));
            dropped += before - bucket.len();
        }
        let before = self.content_library.len();
        self.content_library.retain(|a| seen.insert(a.id.clone()));
        dropped + before - self.content_library.len()
    }
}

/// Where an asset currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "location", content = "stage", rename_all = "snake_case")]
pub enum Location {
    Library,
    Stage(Stage),
}

/// Result of converting a suggestion into a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Accepted {
    Persona(Persona),
    Content {
        asset: ContentAsset,
        location: Location,
    },
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

pub struct Workspace {
    store: Box<dyn KvStore>,
    state: FunnelState,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Load every key from `store`. Missing keys start empty.
    pub fn open(store: impl KvStore + 'static) -> Result<Self> {
        let store: Box<dyn KvStore> = Box::new(store);
        let mut state = FunnelState::default();
        if let Some(raw) = store.get(PERSONAS_KEY)? {
            state.personas = serde_json::from_str(&raw)?;
        }
        if let Some(raw) = store.get(LIBRARY_KEY)? {
            state.content_library = serde_json::from_str(&raw)?;
        }
        if let Some(raw) = store.get(FUNNEL_KEY)? {
            state.funnel_content = serde_json::from_str(&raw)?;
        }
        if let Some(raw) = store.get(COPY_KEY)? {
            state.marketing_copy = raw;
        }
        let dropped = state.dedupe_assets();
        if dropped > 0 {
            tracing::warn!(dropped, "removed duplicated content assets while loading");
        }
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &FunnelState {
        &self.state
    }

    pub fn snapshot(&self) -> FunnelState {
        self.state.clone()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Persist `keys` from `next` and, on success, make `next` current.
    ///
    /// Keys already written are restored to their previous values if a later
    /// key fails, so the store never holds a half-applied mutation.
    fn commit(&mut self, next: FunnelState, keys: &[&'static str]) -> Result<()> {
        let encoded = keys
            .iter()
            .map(|k| next.encode(k).map(|v| (*k, v)))
            .collect::<Result<Vec<_>>>()?;

        let mut written: Vec<(&str, Option<String>)> = Vec::new();
        for &(key, ref value) in &encoded {
            let previous = self.store.get(key)?;
            if let Err(e) = self.store.set(key, value) {
                tracing::error!(key, error = %e, "store write failed; rolling back");
                self.rollback(written);
                return Err(e);
            }
            written.push((key, previous));
        }

        self.state = next;
        Ok(())
    }

    fn rollback(&mut self, written: Vec<(&str, Option<String>)>) {
        for (key, previous) in written.into_iter().rev() {
            let restored = match previous {
                Some(v) => self.store.set(key, &v),
                None => self.store.remove(key),
            };
            if let Err(e) = restored {
                tracing::error!(key, error = %e, "rollback write failed");
            }
        }
    }

    /// Remove every stored key and start empty.
    pub fn reset(&mut self) -> Result<()> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        self.state = FunnelState::default();
        tracing::info!("workspace reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Personas
    // -----------------------------------------------------------------------

    pub fn personas(&self) -> &[Persona] {
        &self.state.personas
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.state.personas.iter().find(|p| p.id == id)
    }

    pub fn create_persona(&mut self, draft: PersonaDraft) -> Result<Persona> {
        self.create_persona_from(draft, PersonaSource::Manual)
    }

    pub fn create_persona_from(
        &mut self,
        draft: PersonaDraft,
        source: PersonaSource,
    ) -> Result<Persona> {
        let persona = Persona::new(draft, source)?;
        let mut next = self.state.clone();
        next.personas.push(persona.clone());
        self.commit(next, &[PERSONAS_KEY])?;
        tracing::debug!(id = %persona.id, %source, "persona created");
        Ok(persona)
    }

    pub fn update_persona(&mut self, id: &str, patch: PersonaPatch) -> Result<Persona> {
        let mut next = self.state.clone();
        let persona = next
            .personas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| FunnelError::PersonaNotFound(id.to_string()))?;
        persona.apply(patch)?;
        let updated = persona.clone();
        self.commit(next, &[PERSONAS_KEY])?;
        Ok(updated)
    }

    /// Delete a persona. Unknown ids are a no-op and return `false`.
    pub fn delete_persona(&mut self, id: &str) -> Result<bool> {
        if self.persona(id).is_none() {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.personas.retain(|p| p.id != id);
        self.commit(next, &[PERSONAS_KEY])?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Content library and stages
    // -----------------------------------------------------------------------

    pub fn library(&self) -> &[ContentAsset] {
        &self.state.content_library
    }

    pub fn stages(&self) -> &StageMap {
        &self.state.funnel_content
    }

    pub fn stage_counts(&self) -> StageCounts {
        self.state.funnel_content.counts()
    }

    pub fn gaps(&self, goal: usize) -> Vec<Gap> {
        self.stage_counts().gaps(goal)
    }

    pub fn locate(&self, asset_id: &str) -> Option<Location> {
        if self.state.content_library.iter().any(|a| a.id == asset_id) {
            return Some(Location::Library);
        }
        self.state.funnel_content.locate(asset_id).map(Location::Stage)
    }

    pub fn asset(&self, asset_id: &str) -> Option<(Location, &ContentAsset)> {
        if let Some(a) = self.state.content_library.iter().find(|a| a.id == asset_id) {
            return Some((Location::Library, a));
        }
        self.state
            .funnel_content
            .find(asset_id)
            .map(|(s, a)| (Location::Stage(s), a))
    }

    pub fn total_assets(&self) -> usize {
        self.state.content_library.len() + self.state.funnel_content.total()
    }

    pub fn add_to_library(&mut self, draft: AssetDraft) -> Result<ContentAsset> {
        self.insert_into_library(draft, AssetOrigin::Manual)
    }

    fn insert_into_library(&mut self, draft: AssetDraft, origin: AssetOrigin) -> Result<ContentAsset> {
        let asset = ContentAsset::new(draft, origin)?;
        let mut next = self.state.clone();
        next.content_library.push(asset.clone());
        self.commit(next, &[LIBRARY_KEY])?;
        tracing::debug!(id = %asset.id, %origin, "asset added to library");
        Ok(asset)
    }

    /// Create an asset directly inside `stage`, bypassing the library.
    pub fn add_to_stage(
        &mut self,
        stage: Stage,
        draft: AssetDraft,
        origin: AssetOrigin,
    ) -> Result<ContentAsset> {
        let asset = ContentAsset::new(draft, origin)?;
        let mut next = self.state.clone();
        next.funnel_content.push(stage, asset.clone());
        self.commit(next, &[FUNNEL_KEY])?;
        tracing::debug!(id = %asset.id, %stage, "asset added to stage");
        Ok(asset)
    }

    pub fn update_asset(&mut self, asset_id: &str, patch: &AssetPatch) -> Result<ContentAsset> {
        let mut next = self.state.clone();
        let (asset, key) = match next.content_library.iter_mut().find(|a| a.id == asset_id) {
            Some(a) => (a, LIBRARY_KEY),
            None => {
                let stage = next
                    .funnel_content
                    .locate(asset_id)
                    .ok_or_else(|| FunnelError::AssetNotFound(asset_id.to_string()))?;
                let asset = next
                    .funnel_content
                    .get_mut(stage)
                    .iter_mut()
                    .find(|a| a.id == asset_id)
                    .ok_or_else(|| FunnelError::AssetNotFound(asset_id.to_string()))?;
                (asset, FUNNEL_KEY)
            }
        };
        asset.apply(patch)?;
        let updated = asset.clone();
        self.commit(next, &[key])?;
        Ok(updated)
    }

    /// Delete an asset wherever it lives, including its stage bucket.
    /// Unknown ids are a no-op and return `false`.
    pub fn remove_from_library(&mut self, asset_id: &str) -> Result<bool> {
        let mut next = self.state.clone();
        let before = next.content_library.len();
        next.content_library.retain(|a| a.id != asset_id);
        let mut keys = Vec::new();
        if next.content_library.len() != before {
            keys.push(LIBRARY_KEY);
        }
        if next.funnel_content.take(asset_id).is_some() {
            keys.push(FUNNEL_KEY);
        }
        if keys.is_empty() {
            return Ok(false);
        }
        self.commit(next, &keys)?;
        Ok(true)
    }

    /// Move an asset to the end of `stage`, removing it from the library or
    /// from the stage it was in.
    pub fn assign(&mut self, asset_id: &str, stage: Stage) -> Result<()> {
        let mut next = self.state.clone();
        let mut keys = vec![FUNNEL_KEY];
        let asset = match next.content_library.iter().position(|a| a.id == asset_id) {
            Some(pos) => {
                keys.push(LIBRARY_KEY);
                next.content_library.remove(pos)
            }
            None => {
                next.funnel_content
                    .take(asset_id)
                    .ok_or_else(|| FunnelError::AssetNotFound(asset_id.to_string()))?
                    .1
            }
        };
        next.funnel_content.push(stage, asset);
        self.commit(next, &keys)?;
        tracing::debug!(asset_id, %stage, "asset assigned");
        Ok(())
    }

    /// Move a staged asset back to the end of the library. Assets already in
    /// the library are left where they are.
    pub fn unassign(&mut self, asset_id: &str) -> Result<()> {
        if self.state.content_library.iter().any(|a| a.id == asset_id) {
            return Ok(());
        }
        let mut next = self.state.clone();
        let (_, asset) = next
            .funnel_content
            .take(asset_id)
            .ok_or_else(|| FunnelError::AssetNotFound(asset_id.to_string()))?;
        next.content_library.push(asset);
        self.commit(next, &[FUNNEL_KEY, LIBRARY_KEY])?;
        tracing::debug!(asset_id, "asset returned to library");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Copy blob
    // -----------------------------------------------------------------------

    pub fn copy(&self) -> &str {
        &self.state.marketing_copy
    }

    pub fn save_copy(&mut self, text: impl Into<String>) -> Result<()> {
        let mut next = self.state.clone();
        next.marketing_copy = text.into();
        self.commit(next, &[COPY_KEY])
    }

    pub fn clear_copy(&mut self) -> Result<()> {
        self.store.remove(COPY_KEY)?;
        self.state.marketing_copy.clear();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Suggestions and wizard
    // -----------------------------------------------------------------------

    /// Build a generator request carrying what is already on file.
    pub fn suggestion_request(&self, topic: SuggestionTopic) -> SuggestionRequest {
        let mut request = SuggestionRequest::new(topic);
        request.personas = self.state.personas.iter().map(|p| p.name.clone()).collect();
        request.existing = self
            .state
            .content_library
            .iter()
            .chain(self.state.funnel_content.iter().flat_map(|(_, b)| b.iter()))
            .map(|a| a.name.clone())
            .collect();
        request
    }

    /// Convert a ready suggestion into a persona or content asset.
    ///
    /// Content aimed at a stage goes straight into that stage; other content
    /// lands in the library. Only a `Ready` batch accepts. The suggestion
    /// leaves the batch only when the record was created, so a failed write
    /// can be retried.
    pub fn accept_suggestion(
        &mut self,
        batch: &mut SuggestionBatch,
        suggestion_id: &str,
    ) -> Result<Accepted> {
        let suggestion = batch.ready(suggestion_id)?.clone();
        let accepted = match suggestion.item {
            SuggestionItem::Persona(draft) => {
                Accepted::Persona(self.create_persona_from(draft, PersonaSource::Ai)?)
            }
            SuggestionItem::Content(idea) => match idea.target_stage {
                Some(stage) => Accepted::Content {
                    asset: self.add_to_stage(stage, idea.asset, AssetOrigin::GapFill)?,
                    location: Location::Stage(stage),
                },
                None => Accepted::Content {
                    asset: self.insert_into_library(idea.asset, AssetOrigin::Suggested)?,
                    location: Location::Library,
                },
            },
        };
        batch.take(suggestion_id)?;
        Ok(accepted)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            personas: self.state.personas.len(),
            assets: self.total_assets(),
            staged: self.state.funnel_content.total(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
