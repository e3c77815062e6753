//! On/off flag telling the navigation process whether an output process is attached.

use crate::core::{
    error::{LearnitError, Result},
    store::{ensure_dir, learnit_dir},
};
use std::fs;
use std::path::{Path, PathBuf};

pub const OUTPUT_PRESENCE: &str = "output";

/// Connected while alive; writes `off` when dropped.
#[derive(Debug)]
pub struct Presence {
    path: PathBuf,
}

impl Presence {
    pub fn path(root: &Path, name: &str) -> PathBuf {
        learnit_dir(root).join(name)
    }

    pub fn connect(root: &Path, name: &str) -> Result<Self> {
        let path = Self::path(root, name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        fs::write(&path, "on").map_err(|e| LearnitError::state_write_failed(&path, e))?;
        log::debug!("presence {} on", path.display());
        Ok(Self { path })
    }

    pub fn check(root: &Path, name: &str) -> bool {
        fs::read_to_string(Self::path(root, name))
            .map(|content| content.trim() == "on")
            .unwrap_or(false)
    }
}

impl Drop for Presence {
    fn drop(&mut self) {
        if let Err(e) = fs::write(&self.path, "off") {
            log::warn!("Could not clear {}: {e}", self.path.display());
        }
    }
}
