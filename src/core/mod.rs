//! Core functionality for the learnit course engine.
//!
//! This module provides the building blocks shared by every command: the
//! version-control seam, the course graph and navigation state machine, the
//! diff renderer, the command lifecycle manager and the file-backed state
//! channel between the navigation and output processes.

pub mod backend;
pub mod channel;
pub mod colors;
pub mod command_spec;
pub mod config;
pub mod course;
pub mod diff;
pub mod dirs;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod naming;
pub mod navigate;
pub mod output;
pub mod presence;
pub mod progress;
pub mod settings;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod testing;

// === Error handling ===
pub use error::{LearnitError, Result};

// === Version control ===
pub use backend::{BranchInfo, CommitInfo, VersionControl};
pub use git::GitRepo;

// === Course graph and navigation ===
pub use course::{build_graph, Chapter, Course, CourseContext, Module, Step};
pub use navigate::Navigator;
pub use progress::{ProgressRecord, ProgressTracker};
pub use state::{resolve, resolve_current, NavigationState, Position};

// === Output process ===
pub use channel::{settle, StateChannel, StateWatcher};
pub use command_spec::{load_command_specs, CommandSpec, Scope};
pub use diff::{parse as parse_diff, Citation, DiffFile, DiffHunk, DiffLine, MarkdownStyle};
pub use lifecycle::{CommandLifecycleManager, OutputMux, ProcessState, RunHistory};
pub use presence::Presence;

// === Configuration ===
pub use config::LearnitConfig;
pub use settings::CourseSettings;

// === Output formatting ===
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
