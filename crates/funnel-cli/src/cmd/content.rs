use crate::output::{print_json, print_table, truncate};
use clap::Subcommand;
use funnel_core::content::{is_known_type, AssetDraft, AssetOrigin, AssetPatch, ContentAsset};
use funnel_core::workspace::Location;
use funnel_core::Stage;
use std::path::Path;

#[derive(Subcommand)]
pub enum ContentSubcommand {
    /// Add a content asset to the library (or straight into a stage)
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        /// Content type, e.g. "Blog Post" or "Case Study"
        #[arg(long = "type", short = 't')]
        content_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Place the new asset directly in this stage
        #[arg(long)]
        stage: Option<String>,
    },
    /// List content, grouped by where it lives
    List {
        /// Only this stage
        #[arg(long, conflicts_with = "library")]
        stage: Option<String>,
        /// Only the unassigned library
        #[arg(long)]
        library: bool,
    },
    /// Edit asset fields
    Edit {
        id: String,
        #[arg(long = "type")]
        content_type: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an asset from the library and from any stage
    Remove { id: String },
    /// Move an asset to the end of a stage
    Assign { id: String, stage: String },
    /// Return a staged asset to the library
    Unassign { id: String },
}

pub fn run(root: &Path, subcmd: ContentSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ContentSubcommand::Add {
            name,
            content_type,
            description,
            notes,
            stage,
        } => {
            let mut draft = AssetDraft::new(content_type, name.join(" "));
            if let Some(d) = description {
                draft = draft.with_description(d);
            }
            if let Some(n) = notes {
                draft = draft.with_notes(n);
            }
            add(root, draft, stage.as_deref(), json)
        }
        ContentSubcommand::List { stage, library } => list(root, stage.as_deref(), library, json),
        ContentSubcommand::Edit {
            id,
            content_type,
            name,
            description,
            notes,
        } => {
            let patch = AssetPatch {
                content_type,
                name,
                description,
                notes,
            };
            edit(root, &id, &patch, json)
        }
        ContentSubcommand::Remove { id } => remove(root, &id, json),
        ContentSubcommand::Assign { id, stage } => assign(root, &id, &stage, json),
        ContentSubcommand::Unassign { id } => unassign(root, &id, json),
    }
}

fn add(root: &Path, draft: AssetDraft, stage: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    if !is_known_type(&draft.content_type) {
        tracing::info!(content_type = %draft.content_type, "using a custom content type");
    }
    let (asset, location) = match stage {
        Some(s) => {
            let stage: Stage = s.parse()?;
            let asset = project
                .workspace
                .add_to_stage(stage, draft, AssetOrigin::Manual)?;
            (asset, Location::Stage(stage))
        }
        None => (project.workspace.add_to_library(draft)?, Location::Library),
    };

    if json {
        print_json(&serde_json::json!({ "asset": asset, "location": location }))?;
    } else {
        println!(
            "Added [{}] {} ({}) to {}",
            asset.id,
            asset.name,
            asset.content_type,
            describe(location)
        );
    }
    Ok(())
}

fn describe(location: Location) -> String {
    match location {
        Location::Library => "the library".to_string(),
        Location::Stage(stage) => format!("stage '{stage}'"),
    }
}

fn asset_row(place: &str, a: &ContentAsset) -> Vec<String> {
    vec![
        a.id.clone(),
        place.to_string(),
        a.content_type.clone(),
        a.name.clone(),
        truncate(&a.description, 40),
    ]
}

fn list(root: &Path, stage: Option<&str>, library_only: bool, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let ws = &project.workspace;
    let only_stage: Option<Stage> = stage.map(str::parse::<Stage>).transpose()?;

    let mut rows = Vec::new();
    let mut entries: Vec<serde_json::Value> = Vec::new();
    if only_stage.is_none() {
        for a in ws.library() {
            rows.push(asset_row("library", a));
            entries.push(serde_json::json!({ "location": Location::Library, "asset": a }));
        }
    }
    if !library_only {
        for (s, bucket) in ws.stages().iter() {
            if only_stage.is_some_and(|only| only != s) {
                continue;
            }
            for a in bucket {
                rows.push(asset_row(s.as_str(), a));
                entries.push(serde_json::json!({ "location": Location::Stage(s), "asset": a }));
            }
        }
    }

    if json {
        return print_json(&entries);
    }
    print_table(&["ID", "WHERE", "TYPE", "NAME", "DESCRIPTION"], rows);
    Ok(())
}

fn edit(root: &Path, id: &str, patch: &AssetPatch, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let asset = project.workspace.update_asset(id, patch)?;
    if json {
        print_json(&asset)?;
    } else {
        println!("Updated [{}] {}", asset.id, asset.name);
    }
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let removed = project.workspace.remove_from_library(id)?;
    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": removed }))?;
    } else if removed {
        println!("Removed [{id}]");
    } else {
        println!("No asset [{id}]; nothing to remove");
    }
    Ok(())
}

fn assign(root: &Path, id: &str, stage: &str, json: bool) -> anyhow::Result<()> {
    let stage: Stage = stage.parse()?;
    let mut project = super::open(root)?;
    project.workspace.assign(id, stage)?;
    if json {
        print_json(&serde_json::json!({ "id": id, "location": Location::Stage(stage) }))?;
    } else {
        println!("Moved [{id}] to stage '{stage}'");
    }
    Ok(())
}

fn unassign(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    project.workspace.unassign(id)?;
    if json {
        print_json(&serde_json::json!({ "id": id, "location": Location::Library }))?;
    } else {
        println!("Returned [{id}] to the library");
    }
    Ok(())
}
