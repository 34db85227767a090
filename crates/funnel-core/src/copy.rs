//! Templated funnel copy built from stage counts and personas.
//!
//! Output is deterministic for identical inputs. LLM-written copy goes
//! through `funnel-llm` instead.

use crate::error::FunnelError;
use crate::persona::Persona;
use crate::stage::{Stage, StageCounts};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Shown instead of a document when no stage holds any content.
pub const EMPTY_GUIDANCE: &str = "No content has been mapped to your funnel yet.\n\n\
Add content to the library and assign it to at least one stage \
(discover, resonate, envision, trust, authority), then generate copy again.\n";

// ---------------------------------------------------------------------------
// CopyTone
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyTone {
    #[default]
    Professional,
    Friendly,
    Bold,
}

impl CopyTone {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyTone::Professional => "professional",
            CopyTone::Friendly => "friendly",
            CopyTone::Bold => "bold",
        }
    }

    fn call_to_action(self, stage: Stage) -> &'static str {
        match (self, stage) {
            (CopyTone::Professional, Stage::Discover) => "Read the latest insights.",
            (CopyTone::Professional, Stage::Resonate) => "See how others handle the same challenge.",
            (CopyTone::Professional, Stage::Envision) => "Explore what the outcome looks like.",
            (CopyTone::Professional, Stage::Trust) => "Review the results our clients report.",
            (CopyTone::Professional, Stage::Authority) => "Schedule a consultation.",
            (CopyTone::Friendly, Stage::Discover) => "Come take a look around!",
            (CopyTone::Friendly, Stage::Resonate) => "Sound familiar? You're in good company.",
            (CopyTone::Friendly, Stage::Envision) => "Picture it with us for a minute.",
            (CopyTone::Friendly, Stage::Trust) => "Hear it straight from people like you.",
            (CopyTone::Friendly, Stage::Authority) => "Let's chat about what's next.",
            (CopyTone::Bold, Stage::Discover) => "Stop scrolling. Start here.",
            (CopyTone::Bold, Stage::Resonate) => "You're not the problem. The old way is.",
            (CopyTone::Bold, Stage::Envision) => "This is what winning looks like.",
            (CopyTone::Bold, Stage::Trust) => "Don't take our word for it. Check the proof.",
            (CopyTone::Bold, Stage::Authority) => "Claim your spot today.",
        }
    }
}

impl fmt::Display for CopyTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CopyTone {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(CopyTone::Professional),
            "friendly" => Ok(CopyTone::Friendly),
            "bold" => Ok(CopyTone::Bold),
            _ => Err(FunnelError::InvalidTone(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(counts: &StageCounts, personas: &[Persona]) -> String {
    render_with_tone(counts, personas, CopyTone::default())
}

pub fn render_with_tone(counts: &StageCounts, personas: &[Persona], tone: CopyTone) -> String {
    if counts.total() == 0 {
        return EMPTY_GUIDANCE.to_string();
    }

    let audience = audience_line(personas);
    let mut out = String::new();
    let _ = writeln!(out, "# Your Marketing Funnel\n");
    let _ = writeln!(out, "Written for {audience}.\n");

    for stage in Stage::ALL {
        let def = stage.def();
        let count = counts.get(stage);
        let _ = writeln!(out, "## {}\n", def.label);
        let _ = writeln!(out, "_{}_\n", def.purpose);
        if count == 0 {
            let _ = writeln!(
                out,
                "No content yet. Consider {} to fill this stage.\n",
                def.hint
            );
            continue;
        }
        let noun = if count == 1 { "piece" } else { "pieces" };
        let _ = writeln!(
            out,
            "{count} {noun} of content speak to {audience} here. {}\n",
            tone.call_to_action(stage)
        );
    }

    let missing: Vec<&str> = Stage::ALL
        .into_iter()
        .filter(|&s| counts.get(s) == 0)
        .map(|s| s.def().label)
        .collect();
    if !missing.is_empty() {
        let _ = writeln!(out, "---\n\nStages still empty: {}.", missing.join(", "));
    }
    out
}

fn audience_line(personas: &[Persona]) -> String {
    match personas {
        [] => "your ideal customer".to_string(),
        [only] => only.name.clone(),
        [init @ .., last] => {
            let names: Vec<&str> = init.iter().map(|p| p.name.as_str()).collect();
            format!("{} and {}", names.join(", "), last.name)
        }
    }
}
