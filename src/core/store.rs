//! JSON files persisted next to the course.
//!
//! Everything learnit shares between processes lives under `<repo>/.learnit/`:
//! the navigation state, learner progress and the output presence flag.
//! [`JsonStore`] is the load/mutate/save wrapper used for progress and run
//! history; the navigation state goes through [`crate::core::channel`].

use crate::core::error::{LearnitError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LEARNIT_DIR: &str = ".learnit";

pub fn learnit_dir(root: &Path) -> PathBuf {
    root.join(LEARNIT_DIR)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        log::error!("Failed to create directory '{}': {}", dir.display(), e);
        LearnitError::state_write_failed(dir, e)
    })
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LearnitError::state_read_failed(path, e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| LearnitError::state_parse_failed(path, e))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| {
        log::error!("Failed to write '{}': {}", path.display(), e);
        LearnitError::state_write_failed(path, e)
    })
}

/// A value mirrored in a JSON file.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    value: T,
}

impl<T: Serialize + DeserializeOwned + Default> JsonStore<T> {
    /// Load `path`, starting from the default value when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let value = read_json(&path)?.unwrap_or_default();
        log::debug!("Opened store {}", path.display());
        Ok(Self { path, value })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.value)
    }

    /// Apply `f` and persist immediately.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let result = f(&mut self.value);
        self.save()?;
        Ok(result)
    }
}
