//! Offline suggestion source backed by stock data.

use crate::content::AssetDraft;
use crate::persona::{Demographics, PersonaDraft};
use crate::stage::Stage;
use crate::suggestion::{
    GeneratorError, Suggestion, SuggestionGenerator, SuggestionRequest, SuggestionTopic,
};
use async_trait::async_trait;

struct StockPersona {
    name: &'static str,
    summary: &'static str,
    role: &'static str,
    age_range: &'static str,
    pain_points: &'static [&'static str],
    goals: &'static [&'static str],
}

const STOCK_PERSONAS: &[StockPersona] = &[
    StockPersona {
        name: "Overwhelmed Owner Olivia",
        summary: "Runs a small service business and wears every hat",
        role: "Founder",
        age_range: "35-50",
        pain_points: &["No time for marketing", "Inconsistent lead flow"],
        goals: &["Predictable pipeline", "Get evenings back"],
    },
    StockPersona {
        name: "Growth-Minded Marcus",
        summary: "Marketing manager at a scaling company, measured on pipeline",
        role: "Marketing Manager",
        age_range: "28-40",
        pain_points: &["Content that does not convert", "Hard to prove ROI"],
        goals: &["Hit quarterly lead targets", "Build a repeatable playbook"],
    },
    StockPersona {
        name: "Skeptical Sam",
        summary: "Has been burned by agencies before and wants proof first",
        role: "Operations Director",
        age_range: "40-55",
        pain_points: &["Vendors overpromise", "Long onboarding"],
        goals: &["Low-risk decisions", "Clear numbers before committing"],
    },
    StockPersona {
        name: "Budget-Conscious Bella",
        summary: "Solo consultant comparing every option on price",
        role: "Independent Consultant",
        age_range: "25-35",
        pain_points: &["Tight budget", "Too many tools"],
        goals: &["Affordable wins", "Simple setup"],
    },
];

fn stock_content(stage: Stage) -> &'static [(&'static str, &'static str, &'static str)] {
    match stage {
        Stage::Discover => &[
            ("Blog Post", "5 Signs Your Marketing Needs a Reset", "Search-friendly entry point for cold traffic"),
            ("Social Post", "Myth vs. Fact Carousel", "Shareable series that widens reach"),
            ("Podcast", "Guest Spot on an Industry Show", "Borrowed audience from a trusted host"),
        ],
        Stage::Resonate => &[
            ("Blog Post", "Why Doing It All Yourself Stops Working", "Names the pain your audience lives with"),
            ("Email Sequence", "The Honest Founder Letters", "Story-driven emails that build rapport"),
        ],
        Stage::Envision => &[
            ("Webinar", "A Week With a Working Funnel", "Live walkthrough of the end state"),
            ("Video", "Before-and-After Product Demo", "Shows the transformation in minutes"),
        ],
        Stage::Trust => &[
            ("Case Study", "How a 12-Person Agency Doubled Leads", "Concrete numbers from a peer"),
            ("Testimonial", "Customer Video Reviews", "Social proof in the customer's own words"),
        ],
        Stage::Authority => &[
            ("Whitepaper", "State of the Industry Report", "Original research that positions you as the expert"),
            ("Landing Page", "Free Strategy Session Offer", "Clear next step for ready buyers"),
            ("Ebook", "The Complete Funnel Playbook", "Deep resource that earns contact details"),
        ],
    }
}

/// Deterministic generator used when no language model is configured.
#[derive(Debug, Clone, Default)]
pub struct CannedGenerator;

impl CannedGenerator {
    pub fn new() -> Self {
        Self
    }

    fn personas(&self, request: &SuggestionRequest) -> Vec<Suggestion> {
        STOCK_PERSONAS
            .iter()
            .filter(|p| !contains_name(&request.personas, p.name))
            .take(request.count)
            .map(|p| {
                let draft = PersonaDraft {
                    name: p.name.to_string(),
                    summary: p.summary.to_string(),
                    demographics: Demographics {
                        role: Some(p.role.to_string()),
                        age_range: Some(p.age_range.to_string()),
                        ..Default::default()
                    },
                    pain_points: p.pain_points.iter().map(|s| s.to_string()).collect(),
                    goals: p.goals.iter().map(|s| s.to_string()).collect(),
                    behaviors: Vec::new(),
                };
                Suggestion::persona(draft)
                    .with_confidence(0.6)
                    .with_reasoning("Common buyer profile for service businesses")
            })
            .collect()
    }

    fn content(&self, request: &SuggestionRequest) -> Vec<Suggestion> {
        Stage::ALL
            .into_iter()
            .flat_map(|stage| stock_content(stage).iter().map(move |c| (stage, c)))
            .filter(|(_, (_, name, _))| !contains_name(&request.existing, name))
            .take(request.count)
            .map(|(stage, &(kind, name, why))| {
                Suggestion::content(AssetDraft::new(kind, name).with_description(why), None)
                    .with_confidence(0.5)
                    .with_reasoning(format!("Fits the {} stage", stage.def().label))
            })
            .collect()
    }

    fn gap_fill(&self, request: &SuggestionRequest, gaps: &[crate::stage::Gap]) -> Vec<Suggestion> {
        let mut out = Vec::new();
        for gap in gaps {
            let ideas = stock_content(gap.stage)
                .iter()
                .filter(|(_, name, _)| !contains_name(&request.existing, name))
                .take(gap.deficit);
            for &(kind, name, why) in ideas {
                out.push(
                    Suggestion::content(
                        AssetDraft::new(kind, name).with_description(why),
                        Some(gap.stage),
                    )
                    .with_confidence(0.7)
                    .with_reasoning(format!(
                        "{} is {} short of the goal",
                        gap.stage.def().label,
                        gap.deficit
                    )),
                );
            }
        }
        out
    }
}

fn contains_name(names: &[String], candidate: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(candidate))
}

#[async_trait]
impl SuggestionGenerator for CannedGenerator {
    async fn generate(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<Suggestion>, GeneratorError> {
        let out = match &request.topic {
            SuggestionTopic::Personas => self.personas(request),
            SuggestionTopic::Content => self.content(request),
            SuggestionTopic::GapFill { gaps } => self.gap_fill(request, gaps),
        };
        Ok(out)
    }
}
