use crate::content::required;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PersonaSource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaSource {
    #[default]
    Manual,
    Ai,
}

impl fmt::Display for PersonaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersonaSource::Manual => "manual",
            PersonaSource::Ai => "ai",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Demographics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
}

impl Demographics {
    fn normalized(self) -> Self {
        Self {
            age_range: non_blank(self.age_range),
            role: non_blank(self.role),
            industry: non_blank(self.industry),
            location: non_blank(self.location),
            income: non_blank(self.income),
        }
    }
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Profile of one category of ideal customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
    #[serde(default)]
    pub source: PersonaSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Persona {
    pub fn new(draft: PersonaDraft, source: PersonaSource) -> Result<Self> {
        let draft = draft.validated()?;
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            summary: draft.summary,
            demographics: draft.demographics,
            pain_points: draft.pain_points,
            goals: draft.goals,
            behaviors: draft.behaviors,
            source,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: PersonaPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            self.name = required("name", name)?;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary.trim().to_string();
        }
        if let Some(d) = patch.demographics {
            self.demographics = d.normalized();
        }
        if let Some(p) = patch.pain_points {
            self.pain_points = clean_list(p);
        }
        if let Some(g) = patch.goals {
            self.goals = clean_list(g);
        }
        if let Some(b) = patch.behaviors {
            self.behaviors = clean_list(b);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PersonaDraft / PersonaPatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDraft {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub behaviors: Vec<String>,
}

impl PersonaDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            name: required("name", &self.name)?,
            summary: self.summary.trim().to_string(),
            demographics: self.demographics.normalized(),
            pain_points: clean_list(self.pain_points),
            goals: clean_list(self.goals),
            behaviors: clean_list(self.behaviors),
        })
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub demographics: Option<Demographics>,
    #[serde(default)]
    pub pain_points: Option<Vec<String>>,
    #[serde(default)]
    pub goals: Option<Vec<String>>,
    #[serde(default)]
    pub behaviors: Option<Vec<String>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
