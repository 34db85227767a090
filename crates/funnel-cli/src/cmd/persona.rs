use crate::output::{print_json, print_table, truncate};
use clap::{Args, Subcommand};
use funnel_core::persona::{Demographics, Persona, PersonaDraft, PersonaPatch};
use std::path::Path;

#[derive(Subcommand)]
pub enum PersonaSubcommand {
    /// Add a persona
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[command(flatten)]
        fields: PersonaFields,
    },
    /// List personas
    List,
    /// Edit persona fields; list flags replace the whole list
    Edit {
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: PersonaFields,
    },
    /// Remove a persona (no error if it is already gone)
    Remove { id: String },
}

#[derive(Args, Default)]
pub struct PersonaFields {
    /// One-line description
    #[arg(long)]
    summary: Option<String>,
    #[arg(long)]
    role: Option<String>,
    #[arg(long)]
    age_range: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    income: Option<String>,
    /// Pain point (repeatable)
    #[arg(long = "pain")]
    pain_points: Vec<String>,
    /// Goal (repeatable)
    #[arg(long = "goal")]
    goals: Vec<String>,
    /// Behavioral tag (repeatable)
    #[arg(long = "behavior")]
    behaviors: Vec<String>,
}

impl PersonaFields {
    fn demographics(&self) -> Option<Demographics> {
        let d = Demographics {
            age_range: self.age_range.clone(),
            role: self.role.clone(),
            industry: self.industry.clone(),
            location: self.location.clone(),
            income: self.income.clone(),
        };
        (d != Demographics::default()).then_some(d)
    }

    fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
        (!list.is_empty()).then_some(list)
    }
}

pub fn run(root: &Path, subcmd: PersonaSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PersonaSubcommand::Add { name, fields } => add(root, &name.join(" "), fields, json),
        PersonaSubcommand::List => list(root, json),
        PersonaSubcommand::Edit { id, name, fields } => edit(root, &id, name, fields, json),
        PersonaSubcommand::Remove { id } => remove(root, &id, json),
    }
}

fn add(root: &Path, name: &str, fields: PersonaFields, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let draft = PersonaDraft {
        name: name.to_string(),
        summary: fields.summary.clone().unwrap_or_default(),
        demographics: fields.demographics().unwrap_or_default(),
        pain_points: fields.pain_points,
        goals: fields.goals,
        behaviors: fields.behaviors,
    };
    let persona = project.workspace.create_persona(draft)?;

    if json {
        print_json(&persona)?;
    } else {
        println!("Added persona [{}]: {}", persona.id, persona.name);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let personas = project.workspace.personas();
    if json {
        return print_json(&personas);
    }
    let rows = personas
        .iter()
        .map(|p: &Persona| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.source.to_string(),
                truncate(&p.summary, 48),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "SOURCE", "SUMMARY"], rows);
    Ok(())
}

fn edit(
    root: &Path,
    id: &str,
    name: Option<String>,
    fields: PersonaFields,
    json: bool,
) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let patch = PersonaPatch {
        name,
        summary: fields.summary.clone(),
        demographics: fields.demographics(),
        pain_points: PersonaFields::non_empty(fields.pain_points),
        goals: PersonaFields::non_empty(fields.goals),
        behaviors: PersonaFields::non_empty(fields.behaviors),
    };
    let persona = project.workspace.update_persona(id, patch)?;

    if json {
        print_json(&persona)?;
    } else {
        println!("Updated persona [{}]: {}", persona.id, persona.name);
    }
    Ok(())
}

fn remove(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let mut project = super::open(root)?;
    let removed = project.workspace.delete_persona(id)?;
    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": removed }))?;
    } else if removed {
        println!("Removed persona [{id}]");
    } else {
        println!("No persona [{id}]; nothing to remove");
    }
    Ok(())
}
