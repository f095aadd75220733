//! File-backed key-value storage modelled on browser local storage.
//!
//! Values are opaque strings; callers serialize their own payloads. The whole
//! map is rewritten on every mutation.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::debug;

/// Thread-safe handle to a storage file. Clones share the same state.
#[derive(Clone)]
pub struct LocalStorage {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the storage file at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(Inner { path, entries })),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> PathBuf {
        self.inner.read().path.clone()
    }

    /// Value stored under `key`.
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Store `value` under `key` and flush to disk.
    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.write();
        inner.entries.insert(key.to_string(), value.into());
        debug!(key, path = %inner.path.display(), "storage item written");
        write_entries(&inner.path, &inner.entries)
    }

    /// Delete `key` and flush to disk. Missing keys are ignored.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.entries.remove(key).is_none() {
            return Ok(());
        }
        write_entries(&inner.path, &inner.entries)
    }

    /// Re-read the backing file, discarding the in-memory view.
    pub fn reload(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.entries = read_entries(&inner.path)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read storage {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse storage {}", path.display()))
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create storage directory {}", parent.display()))?;
    }
    let serialized =
        serde_json::to_string_pretty(entries).context("failed to serialize storage")?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
}
