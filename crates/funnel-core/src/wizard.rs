use crate::error::FunnelError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Personas,
    ContentAudit,
    StageMapping,
    Copy,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::Personas,
        Step::ContentAudit,
        Step::StageMapping,
        Step::Copy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Personas => "personas",
            Step::ContentAudit => "content_audit",
            Step::StageMapping => "stage_mapping",
            Step::Copy => "copy",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personas => "Define your ideal customers",
            Step::ContentAudit => "Audit the content you already have",
            Step::StageMapping => "Map content to funnel stages",
            Step::Copy => "Generate funnel copy",
        }
    }

    /// Whether the step can be entered given the current data.
    pub fn is_unlocked(self, progress: &Progress) -> bool {
        match self {
            Step::Personas => true,
            Step::ContentAudit => progress.personas >= 1,
            Step::StageMapping => progress.personas >= 1 && progress.assets >= 1,
            Step::Copy => progress.staged >= 1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "personas" => Ok(Step::Personas),
            "content_audit" => Ok(Step::ContentAudit),
            "stage_mapping" => Ok(Step::StageMapping),
            "copy" => Ok(Step::Copy),
            _ => Err(FunnelError::InvalidStep(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Counts the unlock predicates read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub personas: usize,
    /// Library plus staged assets.
    pub assets: usize,
    pub staged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    pub step: Step,
    pub title: &'static str,
    pub unlocked: bool,
    pub current: bool,
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Current position in the step sequence.
///
/// Unlocks are recomputed from data on every call, so deleting data can lock
/// a step again. The current step is never moved automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    current: Step,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Move to `step` if it is unlocked. Returns whether the move happened.
    pub fn go_to(&mut self, step: Step, progress: &Progress) -> bool {
        if !step.is_unlocked(progress) {
            tracing::debug!(%step, "step locked");
            return false;
        }
        self.current = step;
        true
    }

    pub fn next(&mut self, progress: &Progress) -> bool {
        match Step::ALL.get(self.current.index() + 1) {
            Some(&step) => self.go_to(step, progress),
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.current.index().checked_sub(1) {
            Some(i) => {
                self.current = Step::ALL[i];
                true
            }
            None => false,
        }
    }

    pub fn steps(&self, progress: &Progress) -> Vec<StepStatus> {
        Step::ALL
            .into_iter()
            .map(|step| StepStatus {
                step,
                title: step.title(),
                unlocked: step.is_unlocked(progress),
                current: step == self.current,
            })
            .collect()
    }
}
