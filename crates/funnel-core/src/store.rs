//! Key-value persistence backing the workspace.
//!
//! The store is deliberately dumb: string keys, string values, synchronous
//! get/set, and an optional byte quota that mirrors the capacity limit of a
//! browser's local storage. Serialization and consistency live in
//! [`crate::workspace`].

use crate::error::{FunnelError, Result};
use crate::{io, paths};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub trait KvStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`. Fails with `QuotaExceeded` when the
    /// store would grow past its capacity; the old value is then untouched.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

fn check_quota(quota: Option<usize>, key: &str, used: usize, old: usize, new: usize) -> Result<()> {
    if let Some(quota) = quota {
        let needed = used - old + new;
        if needed > quota {
            return Err(FunnelError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    /// Total bytes held across keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let old = self
            .entries
            .get(key)
            .map(|v| key.len() + v.len())
            .unwrap_or(0);
        check_quota(
            self.quota,
            key,
            self.used_bytes(),
            old,
            key.len() + value.len(),
        )?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One file per key under a directory, each written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Store rooted at `<root>/.funnel/store`.
    pub fn for_root(root: &Path) -> Self {
        Self::new(paths::store_dir(root))
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.contains('\0')
        {
            return Err(FunnelError::Storage(format!("invalid store key '{key}'")));
        }
        Ok(self.dir.join(paths::key_filename(key)))
    }

    fn used_bytes(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut total = 0usize;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                total += entry.metadata()?.len() as usize;
            }
        }
        Ok(total)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if self.quota.is_some() {
            let old = std::fs::metadata(&path)
                .map(|m| m.len() as usize)
                .unwrap_or(0);
            check_quota(self.quota, key, self.used_bytes()?, old, value.len())?;
        }
        io::atomic_write(&path, value.as_bytes())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        io::remove_if_exists(&path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
