use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// A whole-file JSON store for one keyed-record mapping.
///
/// Reads fail soft: a missing or unparsable file degrades to `T::default()`
/// so store corruption never takes the process down. Writes rewrite the
/// entire file, pretty-printed. Callers that mutate concurrently must
/// serialize their read-modify-write cycles themselves (the ledger and
/// registry each hold a mutex for this).
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the store, degrading to the empty value on any read failure.
    pub fn load(&self) -> T {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!("Failed to read {}: {e}; treating as empty", self.path.display());
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Failed to parse {}: {e}; treating as empty",
                    self.path.display()
                );
                T::default()
            }
        }
    }

    /// Overwrites the store with `value`. Creates parent directories on
    /// first write.
    pub fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(value).context("Failed to serialize store")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
