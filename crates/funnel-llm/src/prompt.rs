//! Prompt text sent to the model.

use crate::copy::CopyRequest;
use funnel_core::stage::{Stage, STAGE_DEFS};
use funnel_core::suggestion::{SuggestionRequest, SuggestionTopic};
use std::fmt::Write as _;

pub const COPY_SYSTEM: &str = "You are a senior marketing strategist who writes conversion-focused \
funnel copy. Use the content inventory and persona you are given. Return Markdown grouped by funnel \
stage, with one `##` heading per stage in this order: Discover, Resonate, Envision, Trust, Authority. \
Under each heading write a short headline, two or three sentences of body copy that reference the \
listed content, and a call to action. Do not invent content that is not listed; if a stage has no \
content, say what kind of piece would fill it.";

pub const SUGGEST_SYSTEM: &str = "You are a senior marketing strategist helping a small business plan \
its content funnel. Reply with a JSON array only, no prose and no code fences.";

pub fn copy_prompt(request: &CopyRequest) -> String {
    let mut out = String::new();
    let tone = request.tone.as_deref().unwrap_or("professional");
    let _ = writeln!(out, "Tone: {tone}");
    match &request.persona {
        Some(p) => {
            let _ = writeln!(out, "Target persona: {}", p.describe());
        }
        None => {
            let _ = writeln!(out, "Target persona: the business's ideal customer");
        }
    }
    let _ = writeln!(out, "\nContent by funnel stage:");
    for def in STAGE_DEFS.iter() {
        let _ = writeln!(out, "\n{} ({})", def.label, def.purpose);
        let items = request
            .funnel_content
            .get(&def.stage)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if items.is_empty() {
            let _ = writeln!(out, "- (none)");
        }
        for item in items {
            let _ = write!(out, "- [{}] {}", item.content_type, item.name);
            if !item.description.is_empty() {
                let _ = write!(out, ": {}", item.description);
            }
            let _ = writeln!(out);
        }
    }
    out
}

pub fn suggestion_prompt(request: &SuggestionRequest) -> String {
    let mut out = String::new();
    if !request.business.trim().is_empty() {
        let _ = writeln!(out, "Business: {}\n", request.business.trim());
    }
    if !request.personas.is_empty() {
        let _ = writeln!(out, "Existing personas: {}", request.personas.join(", "));
    }
    if !request.existing.is_empty() {
        let _ = writeln!(out, "Existing content: {}", request.existing.join(", "));
    }
    let n = request.count;
    match &request.topic {
        SuggestionTopic::Personas => {
            let _ = writeln!(
                out,
                "\nSuggest {n} new customer personas that differ from the existing ones. \
Each element: {{\"name\": string, \"summary\": string, \"demographics\": {{\"ageRange\": string, \
\"role\": string, \"industry\": string, \"location\": string}}, \"painPoints\": [string], \
\"goals\": [string], \"behaviors\": [string], \"confidence\": number 0-1, \"reasoning\": string}}"
            );
        }
        SuggestionTopic::Content => {
            let _ = writeln!(
                out,
                "\nSuggest {n} new content pieces. Each element: {{\"type\": string, \"name\": string, \
\"description\": string, \"confidence\": number 0-1, \"reasoning\": string}}"
            );
        }
        SuggestionTopic::GapFill { gaps } => {
            let _ = writeln!(out, "\nThese funnel stages need more content:");
            for gap in gaps {
                let def = gap.stage.def();
                let _ = writeln!(
                    out,
                    "- {} ({}): {} more, e.g. {}",
                    gap.stage, def.purpose, gap.deficit, def.hint
                );
            }
            let stages: Vec<&str> = Stage::ALL.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(
                out,
                "\nSuggest exactly the missing number of pieces per stage. Each element: \
{{\"type\": string, \"name\": string, \"description\": string, \"targetStage\": one of {}, \
\"confidence\": number 0-1, \"reasoning\": string}}",
                stages.join("|")
            );
        }
    }
    out
}
