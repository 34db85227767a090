use crate::output::{print_json, print_table};
use funnel_core::wizard::Wizard;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = super::open(root)?;
    let progress = project.workspace.progress();

    // The CLI keeps no session, so place the wizard on the furthest step the
    // data currently allows.
    let mut wizard = Wizard::new();
    while wizard.next(&progress) {}
    let steps = wizard.steps(&progress);

    if json {
        return print_json(&serde_json::json!({
            "current": wizard.current(),
            "progress": progress,
            "steps": steps,
        }));
    }

    let rows = steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if s.current { ">" } else { "" };
            let state = if s.unlocked { "open" } else { "locked" };
            vec![
                format!("{marker}{}", i + 1),
                s.step.to_string(),
                s.title.to_string(),
                state.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "STEP", "TITLE", "STATE"], rows);
    println!(
        "\n{} personas, {} content items, {} mapped to stages",
        progress.personas, progress.assets, progress.staged
    );
    Ok(())
}
