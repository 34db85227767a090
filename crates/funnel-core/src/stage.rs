use crate::content::ContentAsset;
use crate::error::FunnelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory minimum number of assets per stage for a healthy funnel.
pub const DEFAULT_GOAL_PER_STAGE: usize = 2;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Position in the marketing funnel, ordered from awareness to action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Discover,
    Resonate,
    Envision,
    Trust,
    Authority,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Discover,
        Stage::Resonate,
        Stage::Envision,
        Stage::Trust,
        Stage::Authority,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::Resonate => "resonate",
            Stage::Envision => "envision",
            Stage::Trust => "trust",
            Stage::Authority => "authority",
        }
    }

    pub fn def(self) -> &'static StageDef {
        &STAGE_DEFS[self.index()]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discover" => Ok(Stage::Discover),
            "resonate" => Ok(Stage::Resonate),
            "envision" => Ok(Stage::Envision),
            "trust" => Ok(Stage::Trust),
            "authority" => Ok(Stage::Authority),
            _ => Err(FunnelError::InvalidStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StageDef
// ---------------------------------------------------------------------------

/// Display and prompting metadata for one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageDef {
    pub stage: Stage,
    pub label: &'static str,
    pub purpose: &'static str,
    /// Kind of content that typically fills the stage, used in prompts.
    pub hint: &'static str,
}

pub static STAGE_DEFS: [StageDef; 5] = [
    StageDef {
        stage: Stage::Discover,
        label: "Discover",
        purpose: "Get found by people who do not know you yet",
        hint: "blog posts, social posts, podcasts and other top-of-funnel reach",
    },
    StageDef {
        stage: Stage::Resonate,
        label: "Resonate",
        purpose: "Show you understand the problem they live with",
        hint: "stories, opinion pieces and content that mirrors their pain points",
    },
    StageDef {
        stage: Stage::Envision,
        label: "Envision",
        purpose: "Help them picture life after the problem is solved",
        hint: "demos, walkthroughs, before-and-after examples and webinars",
    },
    StageDef {
        stage: Stage::Trust,
        label: "Trust",
        purpose: "Prove that you deliver what you promise",
        hint: "case studies, testimonials, reviews and guarantees",
    },
    StageDef {
        stage: Stage::Authority,
        label: "Authority",
        purpose: "Make choosing you the obvious next step",
        hint: "whitepapers, ebooks, original research and landing pages with a clear offer",
    },
];

// ---------------------------------------------------------------------------
// StageMap
// ---------------------------------------------------------------------------

/// Five ordered buckets of content assets. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageMap {
    #[serde(default)]
    pub discover: Vec<ContentAsset>,
    #[serde(default)]
    pub resonate: Vec<ContentAsset>,
    #[serde(default)]
    pub envision: Vec<ContentAsset>,
    #[serde(default)]
    pub trust: Vec<ContentAsset>,
    #[serde(default)]
    pub authority: Vec<ContentAsset>,
}

impl StageMap {
    pub fn get(&self, stage: Stage) -> &[ContentAsset] {
        match stage {
            Stage::Discover => &self.discover,
            Stage::Resonate => &self.resonate,
            Stage::Envision => &self.envision,
            Stage::Trust => &self.trust,
            Stage::Authority => &self.authority,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut Vec<ContentAsset> {
        match stage {
            Stage::Discover => &mut self.discover,
            Stage::Resonate => &mut self.resonate,
            Stage::Envision => &mut self.envision,
            Stage::Trust => &mut self.trust,
            Stage::Authority => &mut self.authority,
        }
    }

    /// Stage currently holding `asset_id`, if any.
    pub fn locate(&self, asset_id: &str) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|&s| self.get(s).iter().any(|a| a.id == asset_id))
    }

    pub fn find(&self, asset_id: &str) -> Option<(Stage, &ContentAsset)> {
        Stage::ALL.into_iter().find_map(|s| {
            self.get(s)
                .iter()
                .find(|a| a.id == asset_id)
                .map(|a| (s, a))
        })
    }

    /// Remove `asset_id` from whichever bucket holds it.
    pub fn take(&mut self, asset_id: &str) -> Option<(Stage, ContentAsset)> {
        for stage in Stage::ALL {
            let bucket = self.get_mut(stage);
            if let Some(pos) = bucket.iter().position(|a| a.id == asset_id) {
                return Some((stage, bucket.remove(pos)));
            }
        }
        None
    }

    pub fn push(&mut self, stage: Stage, asset: ContentAsset) {
        self.get_mut(stage).push(asset);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &[ContentAsset])> + '_ {
        Stage::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn counts(&self) -> StageCounts {
        let mut counts = StageCounts::default();
        for stage in Stage::ALL {
            counts.set(stage, self.get(stage).len());
        }
        counts
    }

    pub fn total(&self) -> usize {
        Stage::ALL.into_iter().map(|s| self.get(s).len()).sum()
    }
}

// ---------------------------------------------------------------------------
// StageCounts / Gap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub discover: usize,
    pub resonate: usize,
    pub envision: usize,
    pub trust: usize,
    pub authority: usize,
}

impl StageCounts {
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Discover => self.discover,
            Stage::Resonate => self.resonate,
            Stage::Envision => self.envision,
            Stage::Trust => self.trust,
            Stage::Authority => self.authority,
        }
    }

    pub fn set(&mut self, stage: Stage, count: usize) {
        let slot = match stage {
            Stage::Discover => &mut self.discover,
            Stage::Resonate => &mut self.resonate,
            Stage::Envision => &mut self.envision,
            Stage::Trust => &mut self.trust,
            Stage::Authority => &mut self.authority,
        };
        *slot = count;
    }

    pub fn total(&self) -> usize {
        Stage::ALL.into_iter().map(|s| self.get(s)).sum()
    }

    /// Stages below `goal`, in funnel order, with how many items each is short.
    pub fn gaps(&self, goal: usize) -> Vec<Gap> {
        Stage::ALL
            .into_iter()
            .filter_map(|stage| {
                let deficit = goal.saturating_sub(self.get(stage));
                (deficit > 0).then_some(Gap { stage, deficit })
            })
            .collect()
    }

    pub fn is_healthy(&self, goal: usize) -> bool {
        self.gaps(goal).is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub stage: Stage,
    pub deficit: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AssetDraft, AssetOrigin, ContentAsset};

    fn asset(name: &str) -> ContentAsset {
        ContentAsset::new(AssetDraft::new("Blog Post", name), AssetOrigin::Manual).unwrap()
    }

    #[test]
    fn stage_parse_and_display() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert_eq!(" Trust ".parse::<Stage>().unwrap(), Stage::Trust);
        assert!(matches!(
            "awareness".parse::<Stage>(),
            Err(FunnelError::InvalidStage(_))
        ));
    }

    #[test]
    fn stage_order_is_funnel_order() {
        assert!(Stage::Discover < Stage::Authority);
        for (i, def) in STAGE_DEFS.iter().enumerate() {
            assert_eq!(def.stage.index(), i);
        }
    }

    #[test]
    fn empty_map_has_five_gaps_of_goal() {
        let gaps = StageMap::default().counts().gaps(2);
        assert_eq!(gaps.len(), 5);
        assert!(gaps.iter().all(|g| g.deficit == 2));
        assert_eq!(gaps[0].stage, Stage::Discover);
        assert_eq!(gaps[4].stage, Stage::Authority);
    }

    #[test]
    fn filled_stage_drops_out_of_gaps() {
        let mut map = StageMap::default();
        map.push(Stage::Discover, asset("a"));
        map.push(Stage::Discover, asset("b"));
        map.push(Stage::Trust, asset("c"));
        let gaps = map.counts().gaps(2);
        assert!(gaps.iter().all(|g| g.stage != Stage::Discover));
        let trust = gaps.iter().find(|g| g.stage == Stage::Trust).unwrap();
        assert_eq!(trust.deficit, 1);
        assert!(!map.counts().is_healthy(2));
        assert!(map.counts().is_healthy(0));
    }

    #[test]
    fn take_removes_from_owning_bucket() {
        let mut map = StageMap::default();
        let a = asset("a");
        let id = a.id.clone();
        map.push(Stage::Envision, a);
        assert_eq!(map.locate(&id), Some(Stage::Envision));
        let (stage, taken) = map.take(&id).unwrap();
        assert_eq!(stage, Stage::Envision);
        assert_eq!(taken.id, id);
        assert_eq!(map.locate(&id), None);
        assert!(map.take(&id).is_none());
    }

    #[test]
    fn serializes_exactly_five_keys() {
        let json = serde_json::to_value(StageMap::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for stage in Stage::ALL {
            assert!(obj[stage.as_str()].as_array().unwrap().is_empty());
        }
    }
}
