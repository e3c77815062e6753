//! Learner progress per chapter.
//!
//! Persisted as `.learnit/progress.json`, a nested `module → chapter →
//! { completed, commit, completed_at? }` mapping keyed by branch. Records are created lazily on
//! first visit and every mutation is written to disk immediately.

use crate::core::{
    error::Result,
    store::{learnit_dir, JsonStore},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub completed: bool,
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub type ProgressMap = BTreeMap<String, BTreeMap<String, ProgressRecord>>;

pub struct ProgressTracker {
    store: JsonStore<ProgressMap>,
}

impl ProgressTracker {
    /// Progress of the course rooted at `root`.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_file(learnit_dir(root).join("progress.json"))
    }

    pub fn open_file(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::open(path)?,
        })
    }

    fn record_mut<'a>(
        progress: &'a mut ProgressMap,
        module: &str,
        chapter: &str,
    ) -> &'a mut ProgressRecord {
        progress
            .entry(module.to_string())
            .or_default()
            .entry(chapter.to_string())
            .or_default()
    }

    pub fn record(&self, module: &str, chapter: &str) -> Option<&ProgressRecord> {
        self.store.value().get(module)?.get(chapter)
    }

    pub fn mark_completed(&mut self, module: &str, chapter: &str) -> Result<()> {
        log::debug!("progress: {module}/{chapter} completed");
        self.store.update(|progress| {
            let record = Self::record_mut(progress, module, chapter);
            record.completed = true;
            record.completed_at.get_or_insert_with(chrono::Utc::now);
        })
    }

    pub fn update_commit(&mut self, module: &str, chapter: &str, commit: &str) -> Result<()> {
        self.store.update(|progress| {
            Self::record_mut(progress, module, chapter).commit = commit.to_string();
        })
    }

    /// Forget everything recorded for a chapter.
    pub fn reset(&mut self, module: &str, chapter: &str) -> Result<()> {
        self.store.update(|progress| {
            *Self::record_mut(progress, module, chapter) = ProgressRecord::default();
        })
    }

    /// Number of completed chapters in a module.
    pub fn count(&self, module: &str) -> usize {
        self.store
            .value()
            .get(module)
            .map(|chapters| chapters.values().filter(|r| r.completed).count())
            .unwrap_or(0)
    }

    /// Last commit visited in a chapter, if any.
    pub fn last_commit(&self, module: &str, chapter: &str) -> Option<&str> {
        self.record(module, chapter)
            .map(|record| record.commit.as_str())
            .filter(|commit| !commit.is_empty())
    }

    /// First chapter (by key) of a module whose record is not completed.
    pub fn current_incomplete(&self, module: &str) -> Option<&str> {
        self.store
            .value()
            .get(module)?
            .iter()
            .find(|(_, record)| !record.completed)
            .map(|(chapter, _)| chapter.as_str())
    }
}
