use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, goal: Option<usize>, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let goal = goal.unwrap_or(project.config.goal_per_stage);
    let gaps = project.workspace.gaps(goal);

    if json {
        return print_json(&serde_json::json!({ "goal": goal, "gaps": gaps }));
    }
    if gaps.is_empty() {
        println!("Every stage has at least {goal} items.");
        return Ok(());
    }
    let rows = gaps
        .iter()
        .map(|g| {
            let def = g.stage.def();
            vec![
                def.label.to_string(),
                g.deficit.to_string(),
                def.hint.to_string(),
            ]
        })
        .collect();
    print_table(&["STAGE", "MISSING", "TRY"], rows);
    println!("\nFill them with: funnel suggest gaps");
    Ok(())
}
