use crate::output::{print_json, print_table};
use funnel_core::stage::STAGE_DEFS;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let ws = &project.workspace;
    let goal = project.config.goal_per_stage;
    let counts = ws.stage_counts();

    if json {
        let mut body = serde_json::to_value(ws.state())?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert("project".into(), serde_json::json!(project.config.project.name));
            obj.insert("counts".into(), serde_json::to_value(counts)?);
            obj.insert("gaps".into(), serde_json::to_value(counts.gaps(goal))?);
            obj.insert("progress".into(), serde_json::to_value(ws.progress())?);
        }
        return print_json(&body);
    }

    println!("Project:  {}", project.config.project.name);
    if let Some(business) = &project.config.project.business {
        println!("Business: {business}");
    }
    println!("Personas: {}", ws.personas().len());
    println!("Library:  {} unassigned", ws.library().len());
    println!();

    let rows = STAGE_DEFS
        .iter()
        .map(|def| {
            let count = counts.get(def.stage);
            let status = if count >= goal {
                "ok".to_string()
            } else {
                format!("needs {}", goal - count)
            };
            vec![def.label.to_string(), count.to_string(), status]
        })
        .collect();
    print_table(&["STAGE", "ITEMS", "STATUS"], rows);

    println!();
    if ws.copy().is_empty() {
        println!("Copy: not saved");
    } else {
        println!("Copy: saved ({} bytes)", ws.copy().len());
    }
    Ok(())
}
