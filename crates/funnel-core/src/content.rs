use crate::error::{FunnelError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suggested vocabulary for `ContentAsset::content_type`. Not enforced.
pub const CONTENT_TYPES: &[&str] = &[
    "Blog Post",
    "Case Study",
    "Video",
    "Webinar",
    "Email Sequence",
    "Social Post",
    "Whitepaper",
    "Ebook",
    "Testimonial",
    "Landing Page",
    "Podcast",
    "Infographic",
];

pub fn is_known_type(content_type: &str) -> bool {
    CONTENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(content_type.trim()))
}

// ---------------------------------------------------------------------------
// AssetOrigin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetOrigin {
    #[default]
    Manual,
    Suggested,
    GapFill,
}

impl fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetOrigin::Manual => "manual",
            AssetOrigin::Suggested => "suggested",
            AssetOrigin::GapFill => "gap_fill",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ContentAsset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub origin: AssetOrigin,
    pub created_at: DateTime<Utc>,
}

impl ContentAsset {
    /// Validate `draft` and mint a fresh asset with a new id.
    pub fn new(draft: AssetDraft, origin: AssetOrigin) -> Result<Self> {
        let draft = draft.validated()?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_type: draft.content_type,
            name: draft.name,
            description: draft.description,
            notes: draft.notes,
            origin,
            created_at: Utc::now(),
        })
    }

    pub fn apply(&mut self, patch: &AssetPatch) -> Result<()> {
        if let Some(t) = &patch.content_type {
            self.content_type = required("type", t)?;
        }
        if let Some(name) = &patch.name {
            self.name = required("name", name)?;
        }
        if let Some(d) = &patch.description {
            self.description = d.trim().to_string();
        }
        if let Some(n) = &patch.notes {
            self.notes = n.trim().to_string();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AssetDraft / AssetPatch
// ---------------------------------------------------------------------------

/// Fields supplied when creating an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDraft {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
}

impl AssetDraft {
    pub fn new(content_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Trim every field and reject a blank type or name.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            content_type: required("type", &self.content_type)?,
            name: required("name", &self.name)?,
            description: self.description.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPatch {
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FunnelError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_asset_trims_and_assigns_id() {
        let a = ContentAsset::new(
            AssetDraft::new(" Case Study ", "  Acme rollout ").with_description(" 40% faster "),
            AssetOrigin::Manual,
        )
        .unwrap();
        assert_eq!(a.content_type, "Case Study");
        assert_eq!(a.name, "Acme rollout");
        assert_eq!(a.description, "40% faster");
        assert!(!a.id.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let a = ContentAsset::new(AssetDraft::new("Video", "a"), AssetOrigin::Manual).unwrap();
        let b = ContentAsset::new(AssetDraft::new("Video", "a"), AssetOrigin::Manual).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn blank_type_or_name_rejected() {
        let err = ContentAsset::new(AssetDraft::new("  ", "name"), AssetOrigin::Manual).unwrap_err();
        assert!(matches!(err, FunnelError::Validation { ref field, .. } if field == "type"));
        let err = ContentAsset::new(AssetDraft::new("Video", ""), AssetOrigin::Manual).unwrap_err();
        assert!(matches!(err, FunnelError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn patch_cannot_blank_name() {
        let mut a = ContentAsset::new(AssetDraft::new("Video", "Demo"), AssetOrigin::Manual).unwrap();
        let patch = AssetPatch {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(a.apply(&patch).is_err());
        let patch = AssetPatch {
            notes: Some("record in May".into()),
            ..Default::default()
        };
        a.apply(&patch).unwrap();
        assert_eq!(a.notes, "record in May");
        assert_eq!(a.name, "Demo");
    }

    #[test]
    fn serializes_type_field_name() {
        let a = ContentAsset::new(AssetDraft::new("Ebook", "Guide"), AssetOrigin::GapFill).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "Ebook");
        assert_eq!(json["origin"], "gap_fill");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn known_types_are_case_insensitive() {
        assert!(is_known_type("blog post"));
        assert!(!is_known_type("Carrier Pigeon"));
    }
}
