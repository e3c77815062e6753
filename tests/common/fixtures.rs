//! Predefined course scenarios
//!
//! Each fixture returns a repository checked out on `main`, together with
//! the hashes the tests navigate between.

#![allow(dead_code)]

use super::repository::*;
use learnit::core::error::Result;

pub const INTRO_SCRIPT: &str = "# Basics\n\
Read the library entry point [lib](/src/lib.rs#L1-L2) before moving on.\n";

pub struct CourseRepo {
    pub repo: TestRepo,
    /// Non-step commit opening the basics chapter
    pub chapter_start: String,
    pub steps: Vec<String>,
}

/// A course with one described module and a three-commit chapter:
///
/// ```text
/// main                 Initial commit
/// module-intro         Introduce the module
/// intro-chapter-basics Prepare basics, step: create lib, step: extend lib
/// ```
pub fn create_course_repo() -> Result<CourseRepo> {
    let repo = setup_test_repo()?;
    let path = repo.path().to_path_buf();

    commit_files(&path, &[("README.md", "# Rust course\n")], "Initial commit")?;

    create_branch(&path, "module-intro")?;
    commit_files(&path, &[("NOTES.md", "notes\n")], "Introduce the module")?;
    describe_branch(&path, "module-intro", "Getting Started")?;

    create_branch(&path, "intro-chapter-basics")?;
    let chapter_start = commit_files(&path, &[("Cargo.toml", "[package]\n")], "Prepare basics")?;
    let first = commit_files(
        &path,
        &[
            ("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n"),
            ("module-intro.md", INTRO_SCRIPT),
        ],
        "step: create lib",
    )?;
    let second = commit_files(
        &path,
        &[(
            "src/lib.rs",
            "pub fn answer() -> u32 {\n    42\n}\n\npub fn double() -> u32 {\n    answer() * 2\n}\n",
        )],
        "step: extend lib",
    )?;

    checkout(&path, "main")?;

    Ok(CourseRepo {
        repo,
        chapter_start,
        steps: vec![first, second],
    })
}

/// A course with a shell command attached to the chapter branch
pub fn create_course_repo_with_command(run: &str) -> Result<CourseRepo> {
    let course = create_course_repo()?;
    let commands = format!(r#"[{{"run": "{run}", "refresh": false}}]"#);
    git(
        course.repo.path(),
        &["config", "learnit.intro-chapter-basics.commands", &commands],
    )?;
    Ok(course)
}
