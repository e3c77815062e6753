//! Common assertion helpers for test output validation
//!
//! Provides predicates for the messages learnit prints and a reader for the
//! state file the navigation commands publish.

#![allow(dead_code)]

use learnit::core::{error::Result, NavigationState};
use predicates::prelude::*;
use std::fs;
use std::path::Path;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// The confirmation printed after a successful move
pub fn now_at(title: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Now at {title}"))
}

pub fn checkout_refused() -> impl Predicate<str> {
    predicates::str::contains("Cannot check out")
}

/// Read the state published under `.learnit/state.json`
pub fn published_state(repo_path: &Path) -> Result<NavigationState> {
    let content = fs::read_to_string(repo_path.join(".learnit").join("state.json"))?;
    Ok(serde_json::from_str(&content)?)
}
