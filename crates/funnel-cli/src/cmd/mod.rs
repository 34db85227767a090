pub mod content;
pub mod copy;
pub mod gaps;
pub mod init;
pub mod persona;
pub mod serve;
pub mod state;
pub mod suggest;
pub mod wizard;

use anyhow::Context;
use funnel_core::config::{Config, WarnLevel};
use funnel_core::store::FileStore;
use funnel_core::{paths, FunnelError, Workspace};
use std::path::Path;

/// An initialized project: its config and the workspace over its store.
pub struct Project {
    pub config: Config,
    pub workspace: Workspace,
}

/// Open the project at `root`, failing if `funnel init` has not been run.
pub fn open(root: &Path) -> anyhow::Result<Project> {
    if !paths::funnel_dir(root).is_dir() {
        return Err(FunnelError::NotInitialized.into());
    }
    let config = Config::load(root).context("failed to load config.yaml")?;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => tracing::error!("{}", warning.message),
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
        }
    }
    let store = FileStore::for_root(root).with_quota(config.store.quota_bytes);
    let workspace = Workspace::open(store).context("failed to load saved funnel data")?;
    Ok(Project { config, workspace })
}
