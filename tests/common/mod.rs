//! Shared utilities for learnit integration tests
//!
//! Builds real git repositories laid out as courses and provides output
//! predicates for the CLI tests.

pub mod assertions;
pub mod fixtures;
pub mod repository;
