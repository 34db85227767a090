use funnel_core::config::Config;
use funnel_core::store::FileStore;
use funnel_core::wizard::Wizard;
use funnel_core::Workspace;
use funnel_llm::{ChatClient, CopyWriter, LlmCopyWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::AppError;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub workspace: Arc<Mutex<Workspace>>,
    pub wizard: Arc<Mutex<Wizard>>,
    pub copy_writer: Arc<dyn CopyWriter>,
}

impl AppState {
    /// Open the project at `root`: config, file-backed store, and a model
    /// client built from `llm` settings.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root)?;
        let store = FileStore::for_root(root).with_quota(config.store.quota_bytes);
        let workspace = Workspace::open(store)?;
        let client = ChatClient::from_config(&config.llm)?;
        if !client.has_api_key() {
            tracing::warn!(
                env = %config.llm.api_key_env,
                "no API key set; copy generation will be rejected upstream"
            );
        }
        Ok(Self::new(
            root.to_path_buf(),
            config,
            workspace,
            Arc::new(LlmCopyWriter::new(client)),
        ))
    }

    pub fn new(
        root: PathBuf,
        config: Config,
        workspace: Workspace,
        copy_writer: Arc<dyn CopyWriter>,
    ) -> Self {
        Self {
            root,
            config: Arc::new(config),
            workspace: Arc::new(Mutex::new(workspace)),
            wizard: Arc::new(Mutex::new(Wizard::new())),
            copy_writer,
        }
    }

    /// Run `f` against the workspace on the blocking pool.
    ///
    /// Store writes are synchronous file IO, so handlers never hold the lock
    /// on a runtime worker.
    pub async fn with_workspace<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Workspace) -> funnel_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let workspace = Arc::clone(&self.workspace);
        tokio::task::spawn_blocking(move || {
            let mut guard = workspace
                .lock()
                .map_err(|_| anyhow::anyhow!("workspace lock poisoned"))?;
            f(&mut guard).map_err(anyhow::Error::from)
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        .map_err(AppError)
    }
}
