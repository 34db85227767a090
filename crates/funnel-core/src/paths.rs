use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FUNNEL_DIR: &str = ".funnel";
pub const STORE_DIR: &str = ".funnel/store";
pub const CONFIG_FILE: &str = ".funnel/config.yaml";

// ---------------------------------------------------------------------------
// Store keys
// ---------------------------------------------------------------------------

pub const PERSONAS_KEY: &str = "personas";
pub const LIBRARY_KEY: &str = "contentLibrary";
pub const FUNNEL_KEY: &str = "funnelContent";
pub const COPY_KEY: &str = "marketingCopy";

pub const ALL_KEYS: [&str; 4] = [PERSONAS_KEY, LIBRARY_KEY, FUNNEL_KEY, COPY_KEY];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn funnel_dir(root: &Path) -> PathBuf {
    root.join(FUNNEL_DIR)
}

pub fn store_dir(root: &Path) -> PathBuf {
    root.join(STORE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// File backing a single store key. The copy blob is plain Markdown; every
/// other key holds JSON.
pub fn key_filename(key: &str) -> String {
    if key == COPY_KEY {
        format!("{key}.md")
    } else {
        format!("{key}.json")
    }
}
