use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::{Args, Subcommand};
use funnel_core::canned::CannedGenerator;
use funnel_core::config::Config;
use funnel_core::suggestion::{
    fetch, BatchPhase, Suggestion, SuggestionBatch, SuggestionGenerator, SuggestionItem,
    SuggestionTopic,
};
use funnel_core::workspace::{Accepted, Location};
use funnel_llm::{ChatClient, LlmSuggestionGenerator};
use std::collections::HashSet;
use std::path::Path;

#[derive(Subcommand)]
pub enum SuggestSubcommand {
    /// Suggest new customer personas
    Personas(SuggestArgs),
    /// Suggest content for the library
    Content(SuggestArgs),
    /// Suggest content for stages below the goal, placed straight into them
    Gaps {
        /// Items wanted per stage (default from config)
        #[arg(long)]
        goal: Option<usize>,
        #[command(flatten)]
        args: SuggestArgs,
    },
}

#[derive(Args)]
pub struct SuggestArgs {
    /// How many suggestions to ask for
    #[arg(long, default_value = "3")]
    count: usize,
    /// Accept every suggestion
    #[arg(long, conflicts_with = "accept")]
    accept_all: bool,
    /// Accept suggestion N from the list (1-based, repeatable)
    #[arg(long)]
    accept: Vec<usize>,
    /// Use built-in suggestions instead of the language model
    #[arg(long)]
    offline: bool,
}

pub fn run(root: &Path, subcmd: SuggestSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SuggestSubcommand::Personas(args) => suggest(root, SuggestionTopic::Personas, args, json),
        SuggestSubcommand::Content(args) => suggest(root, SuggestionTopic::Content, args, json),
        SuggestSubcommand::Gaps { goal, args } => {
            let project = super::open(root)?;
            let goal = goal.unwrap_or(project.config.goal_per_stage);
            let gaps = project.workspace.gaps(goal);
            if gaps.is_empty() {
                if json {
                    return print_json(&serde_json::json!({ "suggestions": [], "accepted": [] }));
                }
                println!("Every stage has at least {goal} items; nothing to fill.");
                return Ok(());
            }
            suggest(root, SuggestionTopic::GapFill { gaps }, args, json)
        }
    }
}

fn generator_for(config: &Config, offline: bool) -> anyhow::Result<Box<dyn SuggestionGenerator>> {
    if offline {
        return Ok(Box::new(CannedGenerator::new()));
    }
    let client = ChatClient::from_config(&config.llm)?;
    if !client.has_api_key() {
        eprintln!(
            "note: {} is not set; using built-in suggestions",
            config.llm.api_key_env
        );
        return Ok(Box::new(CannedGenerator::new()));
    }
    Ok(Box::new(LlmSuggestionGenerator::new(client)))
}

fn suggest(
    root: &Path,
    topic: SuggestionTopic,
    args: SuggestArgs,
    json: bool,
) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let count = match &topic {
        SuggestionTopic::GapFill { gaps } => gaps.iter().map(|g| g.deficit).sum(),
        _ => args.count,
    };
    let mut request = project.workspace.suggestion_request(topic).with_count(count);
    if let Some(business) = &project.config.project.business {
        request = request.with_business(business.as_str());
    }

    let generator = generator_for(&project.config, args.offline)?;
    let mut batch = SuggestionBatch::new();
    let ticket = batch
        .request()
        .context("a suggestion request is already running")?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(fetch(
        generator.as_ref(),
        &request,
        project.config.llm.timeout(),
    ));
    batch.complete(ticket, result);
    if let BatchPhase::Errored(message) = batch.phase() {
        anyhow::bail!("could not get suggestions: {message}");
    }

    let shown: Vec<Suggestion> = batch.items().to_vec();
    let mut picks: Vec<String> = if args.accept_all {
        shown.iter().map(|s| s.id.clone()).collect()
    } else {
        args.accept
            .iter()
            .map(|&n| {
                n.checked_sub(1)
                    .and_then(|i| shown.get(i))
                    .map(|s| s.id.clone())
                    .with_context(|| format!("no suggestion #{n} (have {})", shown.len()))
            })
            .collect::<anyhow::Result<_>>()?
    };
    let mut seen = HashSet::new();
    picks.retain(|id| seen.insert(id.clone()));

    let mut accepted = Vec::new();
    for id in &picks {
        accepted.push(project.workspace.accept_suggestion(&mut batch, id)?);
    }

    if json {
        return print_json(&serde_json::json!({
            "suggestions": shown,
            "accepted": accepted,
        }));
    }

    if shown.is_empty() {
        println!("No suggestions this time.");
        return Ok(());
    }
    let rows = shown
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let (kind, target) = match &s.item {
                SuggestionItem::Persona(_) => ("persona", String::new()),
                SuggestionItem::Content(c) => (
                    "content",
                    c.target_stage.map(|t| t.to_string()).unwrap_or_default(),
                ),
            };
            vec![
                (i + 1).to_string(),
                kind.to_string(),
                s.title().to_string(),
                target,
                s.confidence
                    .map(|c| format!("{:.0}%", c * 100.0))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["#", "KIND", "TITLE", "STAGE", "CONFIDENCE"], rows);

    if accepted.is_empty() {
        println!("\nAccept with --accept <N> or --accept-all.");
    } else {
        println!();
        for a in &accepted {
            match a {
                Accepted::Persona(p) => println!("Accepted persona [{}]: {}", p.id, p.name),
                Accepted::Content { asset, location } => {
                    let place = match location {
                        Location::Library => "library".to_string(),
                        Location::Stage(s) => format!("stage '{s}'"),
                    };
                    println!("Accepted [{}] {} into {place}", asset.id, asset.name);
                }
            }
        }
    }
    Ok(())
}
