//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`LearnitError`] which covers every failure mode of the
//! course engine. It uses `thiserror` for ergonomic error definitions and
//! includes constructors for the common failure scenarios.
//!
//! # Public API
//! - [`LearnitError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, LearnitError>`
//!
//! # Error Categories
//! - **Repository**: not a repository, git2 errors, failing `git` invocations
//! - **Not found**: unresolved module/chapter/step references (non-fatal)
//! - **Navigation**: checkout refused by the backend
//! - **Processes**: spawn failures of configured commands
//! - **Persisted files**: state/progress/history read, write and parse failures
//! - **Settings**: unknown keys and invalid values

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for learnit
#[derive(Error, Debug)]
pub enum LearnitError {
    // Repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository has no working directory")]
    NoWorkdir,

    #[error("git command failed: {message}")]
    GitCommandFailed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    // Course lookups
    #[error("Unrecognized module '{module}'")]
    ModuleNotFound { module: String },

    #[error("Unrecognized chapter '{chapter}' in module '{module}'")]
    ChapterNotFound { module: String, chapter: String },

    #[error("Unrecognized step '{step}' in chapter '{chapter}'")]
    StepNotFound { chapter: String, step: String },

    #[error("You must be navigated to a chapter to do this")]
    NoCurrentChapter,

    // Navigation
    #[error("Cannot check out '{target}': {message}")]
    CheckoutConflict { target: String, message: String },

    // Commands
    #[error("Failed to start '{command}': {source}")]
    ProcessSpawn {
        command: String,
        source: std::io::Error,
    },

    // Persisted files
    #[error("Failed to read '{path}': {source}")]
    StateReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    StateWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    StateParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not find cache directory")]
    CacheDirectoryNotFound,

    // Settings
    #[error("Invalid settings key '{key}'")]
    InvalidSetting { key: String },

    #[error("Invalid value '{value}' for key '{key}', must be one of: {allowed}")]
    InvalidSettingValue {
        key: String,
        value: String,
        allowed: String,
    },
}

/// Convenience type alias for Results using LearnitError
pub type Result<T> = std::result::Result<T, LearnitError>;

impl LearnitError {
    /// Create a git command failure from captured stderr
    pub fn git_command_failed(message: impl Into<String>) -> Self {
        Self::GitCommandFailed {
            message: message.into(),
        }
    }

    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            module: module.into(),
        }
    }

    pub fn chapter_not_found(module: impl Into<String>, chapter: impl Into<String>) -> Self {
        Self::ChapterNotFound {
            module: module.into(),
            chapter: chapter.into(),
        }
    }

    pub fn step_not_found(chapter: impl Into<String>, step: impl Into<String>) -> Self {
        Self::StepNotFound {
            chapter: chapter.into(),
            step: step.into(),
        }
    }

    /// Create a checkout conflict for a refused checkout
    pub fn checkout_conflict(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckoutConflict {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a spawn failure for a configured command
    pub fn process_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::ProcessSpawn {
            command: command.into(),
            source,
        }
    }

    pub fn state_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn state_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn state_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::StateParseFailed {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_setting(key: impl Into<String>) -> Self {
        Self::InvalidSetting { key: key.into() }
    }

    pub fn invalid_setting_value(
        key: impl Into<String>,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        Self::InvalidSettingValue {
            key: key.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Whether this error is one of the non-fatal "not found" lookups
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotFound { .. } | Self::ChapterNotFound { .. } | Self::StepNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LearnitError::NotInGitRepo;
        assert_eq!(err.to_string(), "Not in a git repository");
    }

    #[test]
    fn test_module_not_found_error() {
        let err = LearnitError::module_not_found("Intro");
        assert_eq!(err.to_string(), "Unrecognized module 'Intro'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_chapter_not_found_error() {
        let err = LearnitError::chapter_not_found("module-intro", "Basics");
        assert_eq!(
            err.to_string(),
            "Unrecognized chapter 'Basics' in module 'module-intro'"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_checkout_conflict_error() {
        let err = LearnitError::checkout_conflict("abc123", "local changes would be overwritten");
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("local changes"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_process_spawn_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = LearnitError::process_spawn("npm start", io_err);
        assert_eq!(err.to_string(), "Failed to start 'npm start': no such file");
    }

    #[test]
    fn test_state_write_failed() {
        let path = std::path::PathBuf::from("/test/state.json");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LearnitError::state_write_failed(&path, io_err);
        assert!(err.to_string().contains("/test/state.json"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_state_parse_failed() {
        let path = std::path::PathBuf::from("/test/progress.json");
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json").unwrap_err();
        let err = LearnitError::state_parse_failed(&path, json_err);
        assert!(err.to_string().contains("/test/progress.json"));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_invalid_setting_value() {
        let err = LearnitError::invalid_setting_value("markdown.active", "maybe", &["true", "false"]);
        assert_eq!(
            err.to_string(),
            "Invalid value 'maybe' for key 'markdown.active', must be one of: true, false"
        );
    }
}
