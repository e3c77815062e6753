//! The version-control interface consumed by the course engine.
//!
//! Everything above this trait (graph building, resolution, navigation, output)
//! only talks to a [`VersionControl`] implementation. [`crate::core::git::GitRepo`]
//! is the production implementation.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A local branch together with its configured description, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
}

pub trait VersionControl {
    /// Local branches whose name starts with `prefix`, in backend order.
    fn list_branches(&self, prefix: &str) -> Result<Vec<BranchInfo>>;

    /// Commits reachable from `to` but not from `from`, oldest first.
    fn log(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>>;

    /// Name of the checked-out branch, or the full commit hash when detached.
    fn current_ref(&self) -> Result<String>;

    /// Resolve any revision expression to a full commit hash.
    fn rev_parse(&self, reference: &str) -> Result<String>;

    /// Move the shared working tree to `reference`.
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Unified diff introduced by the commit `reference`.
    fn diff(&self, reference: &str) -> Result<String>;

    fn get_config(&self, key: &str) -> Result<Option<String>>;

    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Root of the working tree.
    fn root_dir(&self) -> Result<PathBuf>;
}
