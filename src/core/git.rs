//! Git repository operations backing the course engine.
//!
//! This module provides [`GitRepo`], the [`VersionControl`] implementation used
//! by every command. Reads (branches, history, config) go through `git2`;
//! operations that mutate the working tree or need porcelain output (checkout,
//! diff) shell out to the `git` binary so their failures carry git's own
//! messages.
//!
//! # Public API
//! - [`GitRepo`]: Main interface for git repository operations

use crate::core::{
    backend::{BranchInfo, CommitInfo, VersionControl},
    error::{LearnitError, Result},
};
use git2::{BranchType, Repository, Sort};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(GitRepo { repo })
    }

    /// Open the repository containing the current directory
    pub fn open_current() -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        Self::open(&current_dir).map_err(|_| LearnitError::NotInGitRepo)
    }

    fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(LearnitError::NoWorkdir)
    }

    /// Execute a git command in the repository's working directory and return stdout
    fn execute_git_command(&self, mut cmd: std::process::Command) -> Result<String> {
        cmd.current_dir(self.workdir()?);

        let output = cmd.output().map_err(LearnitError::Io)?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(LearnitError::git_command_failed(error_msg.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn resolve_oid(&self, reference: &str) -> Result<git2::Oid> {
        let object = self.repo.revparse_single(reference)?;
        Ok(object.peel_to_commit()?.id())
    }
}

impl VersionControl for GitRepo {
    fn list_branches(&self, prefix: &str) -> Result<Vec<BranchInfo>> {
        let config = self.repo.config()?;
        let mut branches = Vec::new();

        for branch_result in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch_result?;
            let Some(name) = branch.name()? else {
                continue;
            };

            if !name.starts_with(prefix) {
                continue;
            }

            let description = config
                .get_string(&format!("branch.{name}.description"))
                .ok()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());

            branches.push(BranchInfo {
                name: name.to_string(),
                description,
            });
        }

        Ok(branches)
    }

    fn log(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        let mut walker = self.repo.revwalk()?;
        walker.push(self.resolve_oid(to)?)?;
        walker.hide(self.resolve_oid(from)?)?;
        walker.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid_result in walker {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(CommitInfo {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("").trim_end().to_string(),
            });
        }

        Ok(commits)
    }

    fn current_ref(&self) -> Result<String> {
        let head = self.repo.head()?;

        if head.is_branch() {
            if let Some(branch_name) = head.shorthand() {
                return Ok(branch_name.to_string());
            }
        }

        // Detached HEAD
        let oid = head.peel_to_commit()?.id();
        Ok(oid.to_string())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        Ok(self.resolve_oid(reference)?.to_string())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        let mut cmd = std::process::Command::new("git");
        cmd.args(["checkout", "--quiet", reference]);
        self.execute_git_command(cmd)
            .map(|_| ())
            .map_err(|e| match e {
                LearnitError::GitCommandFailed { message } => {
                    LearnitError::checkout_conflict(reference, message)
                }
                other => other,
            })
    }

    fn diff(&self, reference: &str) -> Result<String> {
        let mut cmd = std::process::Command::new("git");
        cmd.args(["diff", "--no-color", "-M", &format!("{reference}^!")]);
        self.execute_git_command(cmd)
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        let config = self.repo.config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.repo.config()?;
        config.set_str(key, value)?;
        Ok(())
    }

    fn root_dir(&self) -> Result<PathBuf> {
        Ok(self.workdir()?.to_path_buf())
    }
}
