//! learnit - turn a git history into a navigable, step-by-step course.
//!
//! A course lives in a single repository: modules and chapters are branches,
//! steps are commits marked `step:`. The library resolves where the checkout
//! sits in that hierarchy, moves it between steps, renders each step's delta
//! and keeps the course's shell commands running for the current position.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - The course graph and navigation state machine
//! - The state channel shared by the navigation and output processes
//! - Diff rendering and command lifecycle management
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    build_graph,
    // Course graph
    Course,
    CourseContext,
    // Output process
    CommandLifecycleManager,
    CommandSpec,
    // Git operations
    GitRepo,
    // Error handling
    LearnitError,
    // Navigation
    NavigationState,
    Navigator,
    Result,
    StateChannel,
    StateWatcher,
    VersionControl,
};
