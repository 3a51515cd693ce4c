//! Client-side preference storage.
//!
//! The browser keeps the selected language in a string-keyed store. Here that
//! store is a trait so the page can be backed by memory (tests, embedding) or
//! by a JSON file that survives between runs of the headless binary.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage key holding the user's selected language code.
pub const SELECTED_LANG_KEY: &str = "selectedLang";

/// A string key/value store scoped to the site.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value. Persistence failures are logged, never returned.
    fn set(&mut self, key: &str, value: &str);
}

/// Volatile store, equivalent to a fresh browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a selected language.
    pub fn with_selected(code: &str) -> Self {
        let mut store = Self::new();
        store.set(SELECTED_LANG_KEY, code);
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Store persisted as a flat JSON object on disk.
///
/// The whole file is rewritten on every `set`; the store only ever holds a
/// handful of keys.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is reported as an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences file {}", path.display()))?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw).with_context(|| {
                    format!("Failed to parse preferences file {}", path.display())
                })?
            }
        } else {
            debug!("Preferences file {} not found, starting empty", path.display());
            HashMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences file {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            warn!("Could not persist preference '{}': {:#}", key, e);
        }
    }
}
