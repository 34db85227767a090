use anyhow::Context;
use funnel_core::config::Config;
use funnel_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, name: Option<&str>, business: Option<&str>) -> anyhow::Result<()> {
    let project_name = name.map(str::to_string).unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "funnel".to_string())
    });

    println!("Initializing funnel in: {}", root.display());

    for dir in [paths::FUNNEL_DIR, paths::STORE_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        let mut config = Config::new(&project_name);
        config.project.business = business.map(str::to_string);
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    println!("\nFunnel initialized.");
    println!("Next: funnel persona add \"<name>\" --summary \"...\"");
    Ok(())
}
