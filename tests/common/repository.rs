//! Git repository management and setup utilities
//!
//! Provides functions for creating throwaway repositories and shaping them into
//! courses: module branches, chapter branches and `step:` commits.

#![allow(dead_code)]

use learnit::core::error::{LearnitError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test repository setup result containing both the temporary directory
/// and the repository path. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file under `.learnit/`
    pub fn learnit_file(&self, name: &str) -> PathBuf {
        self.path.join(".learnit").join(name)
    }
}

/// Run git in `repo_path`, failing on a non-zero exit
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;

    if !output.status.success() {
        return Err(LearnitError::git_command_failed(
            String::from_utf8_lossy(&output.stderr).trim(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a fresh git repository whose root branch is `main`
///
/// The working tree lives in a `rust-course` directory so the course name
/// is predictable.
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().join("rust-course");
    fs::create_dir(&repo_path)?;

    git(&repo_path, &["init", "-q"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;
    git(&repo_path, &["config", "commit.gpgsign", "false"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Creates a file (and its parent directories) with the given content
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Writes the files, stages everything and commits with `message`
pub fn commit_files(repo_path: &Path, files: &[(&str, &str)], message: &str) -> Result<String> {
    for (filename, content) in files {
        create_file(repo_path, filename, content)?;
    }
    git(repo_path, &["add", "--all"])?;
    git(repo_path, &["commit", "-q", "-m", message])?;
    head_commit(repo_path)
}

pub fn checkout(repo_path: &Path, reference: &str) -> Result<()> {
    git(repo_path, &["checkout", "-q", reference])?;
    Ok(())
}

/// Create `branch` from the current HEAD and switch to it
pub fn create_branch(repo_path: &Path, branch: &str) -> Result<()> {
    git(repo_path, &["checkout", "-q", "-b", branch])?;
    Ok(())
}

pub fn describe_branch(repo_path: &Path, branch: &str, description: &str) -> Result<()> {
    git(
        repo_path,
        &["config", &format!("branch.{branch}.description"), description],
    )?;
    Ok(())
}

pub fn head_commit(repo_path: &Path) -> Result<String> {
    git(repo_path, &["rev-parse", "HEAD"])
}

/// Branch name, or the commit hash when HEAD is detached
pub fn current_ref(repo_path: &Path) -> Result<String> {
    match git(repo_path, &["symbolic-ref", "-q", "--short", "HEAD"]) {
        Ok(branch) => Ok(branch),
        Err(_) => head_commit(repo_path),
    }
}
