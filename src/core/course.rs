//! Course graph: modules, chapters and steps derived from branches and commits.
//!
//! The graph is a read-only view recomputed from the [`VersionControl`] backend.
//! [`CourseContext`] owns the backend and a lazily built copy of the graph; the
//! cache is only ever dropped through [`CourseContext::invalidate`], which the
//! navigation engine calls after every checkout.
//!
//! # Public API
//! - [`Course`], [`Module`], [`Chapter`], [`Step`]: the derived tree
//! - [`build_graph`]: builds the tree from the backend
//! - [`CourseContext`]: backend + cached graph passed to every component

use crate::core::{
    backend::{BranchInfo, CommitInfo, VersionControl},
    error::{LearnitError, Result},
    naming,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub label: String,
    pub hash: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub key: Option<char>,
    pub name: String,
    pub branch: String,
    pub steps: Vec<Step>,
    pub commits: Vec<CommitInfo>,
    /// Parent of the first step: where a learner entering the chapter lands.
    #[serde(default)]
    pub start: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub key: Option<char>,
    pub name: String,
    pub branch: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub modules: Vec<Module>,
}

impl Course {
    /// Find a module by branch or by human name
    pub fn find_module(&self, key: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|module| module.branch == key)
            .or_else(|| self.modules.iter().find(|module| module.name == key))
    }

    pub fn module(&self, key: &str) -> Result<&Module> {
        self.find_module(key)
            .ok_or_else(|| LearnitError::module_not_found(key))
    }

    pub fn chapter(&self, module: &str, chapter: &str) -> Result<&Chapter> {
        let found = self.module(module)?;
        found
            .find_chapter(chapter)
            .ok_or_else(|| LearnitError::chapter_not_found(&found.branch, chapter))
    }
}

impl Module {
    /// Find a chapter by branch or by human name
    pub fn find_chapter(&self, key: &str) -> Option<&Chapter> {
        self.chapters
            .iter()
            .find(|chapter| chapter.branch == key)
            .or_else(|| self.chapters.iter().find(|chapter| chapter.name == key))
    }
}

impl Chapter {
    pub fn find_step(&self, label: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.label == label)
    }

    /// Position of the step whose commit is `hash`
    pub fn step_index(&self, hash: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.hash == hash)
    }

    pub fn contains_commit(&self, hash: &str) -> bool {
        self.commits.iter().any(|commit| commit.hash == hash)
    }

    pub fn starts_at(&self, hash: &str) -> bool {
        self.start.as_deref() == Some(hash)
    }
}

/// Sorted branches with their menu key and display name.
fn describe_branches(
    mut branches: Vec<BranchInfo>,
    fallback: fn(&str) -> String,
) -> Vec<(Option<char>, String, String)> {
    branches.sort_by(|a, b| a.name.cmp(&b.name));
    branches
        .into_iter()
        .enumerate()
        .map(|(index, branch)| {
            let name = branch
                .description
                .unwrap_or_else(|| fallback(&branch.name));
            (naming::display_key(index), name, branch.name)
        })
        .collect()
}

/// Commits of a chapter and the step-marked subsequence, both oldest first.
pub fn chapter_commits<B: VersionControl + ?Sized>(
    backend: &B,
    module_branch: &str,
    chapter_branch: &str,
) -> Result<(Vec<CommitInfo>, Vec<Step>)> {
    let commits = backend.log(module_branch, chapter_branch)?;
    let steps = commits
        .iter()
        .filter(|commit| naming::is_step_message(&commit.message))
        .map(|commit| Step {
            label: naming::step_label(&commit.message),
            hash: commit.hash.clone(),
            message: commit.message.clone(),
        })
        .collect();

    Ok((commits, steps))
}

pub fn list_modules<B: VersionControl + ?Sized>(backend: &B) -> Result<Vec<Module>> {
    let branches = backend.list_branches(naming::MODULE_PREFIX)?;
    let branches = branches
        .into_iter()
        .filter(|branch| naming::is_module_branch(&branch.name))
        .collect();

    Ok(describe_branches(branches, naming::module_display_name)
        .into_iter()
        .map(|(key, name, branch)| Module {
            key,
            name,
            branch,
            chapters: Vec::new(),
        })
        .collect())
}

pub fn list_chapters<B: VersionControl + ?Sized>(
    backend: &B,
    module_branch: &str,
) -> Result<Vec<Chapter>> {
    let branches = backend.list_branches(&naming::chapter_prefix(module_branch))?;
    let mut chapters = Vec::new();

    for (key, name, branch) in describe_branches(branches, naming::chapter_display_name) {
        let (commits, steps) = chapter_commits(backend, module_branch, &branch)?;
        let start = match steps.first() {
            Some(first) => backend.rev_parse(&format!("{}^", first.hash)).ok(),
            None => None,
        };
        log::debug!(
            "chapter {branch}: {} commits, {} steps",
            commits.len(),
            steps.len()
        );
        chapters.push(Chapter {
            key,
            name,
            branch,
            steps,
            commits,
            start,
        });
    }

    Ok(chapters)
}

/// Build the whole Module → Chapter → Step tree.
pub fn build_graph<B: VersionControl + ?Sized>(backend: &B) -> Result<Course> {
    let mut modules = list_modules(backend)?;

    for module in &mut modules {
        module.chapters = list_chapters(backend, &module.branch)?;
    }

    let name = course_name(backend);
    log::debug!("built course graph '{name}' with {} modules", modules.len());

    Ok(Course { name, modules })
}

/// Name of the course: the directory holding the working tree.
pub fn course_name<B: VersionControl + ?Sized>(backend: &B) -> String {
    backend
        .root_dir()
        .ok()
        .and_then(|root| root.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

/// Backend plus an explicitly invalidated copy of the course graph.
pub struct CourseContext<B: VersionControl> {
    backend: B,
    graph: Option<Course>,
}

impl<B: VersionControl> CourseContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            graph: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The course graph, built on first use.
    pub fn graph(&mut self) -> Result<&Course> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => build_graph(&self.backend)?,
        };

        Ok(self.graph.insert(graph))
    }

    pub fn invalidate(&mut self) {
        self.graph = None;
    }

    pub fn is_cached(&self) -> bool {
        self.graph.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{sample_course, MemoryRepo};

    #[test]
    fn test_modules_sorted_with_keys_and_names() -> Result<()> {
        let repo = sample_course();
        let course = build_graph(&repo)?;

        let branches: Vec<_> = course.modules.iter().map(|m| m.branch.as_str()).collect();
        assert_eq!(branches, vec!["module-advanced", "module-intro"]);
        assert_eq!(course.modules[0].key, Some('1'));
        assert_eq!(course.modules[1].key, Some('2'));
        assert_eq!(course.modules[0].name, "Advanced");
        // Branch description wins over the de-slugged name
        assert_eq!(course.modules[1].name, "Getting Started");
        Ok(())
    }

    #[test]
    fn test_steps_are_step_commits_oldest_first() -> Result<()> {
        let repo = sample_course();
        let course = build_graph(&repo)?;
        let chapter = course.chapter("module-intro", "intro-chapter-basics")?;

        assert_eq!(chapter.commits.len(), 4);
        let labels: Vec<_> = chapter.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["one", "two", "three"]);
        assert_eq!(chapter.name, "Basics");
        Ok(())
    }

    #[test]
    fn test_chapter_without_steps_is_empty_not_error() -> Result<()> {
        let repo = sample_course();
        let course = build_graph(&repo)?;
        let chapter = course.chapter("module-intro", "Wrap Up")?;

        assert!(chapter.steps.is_empty());
        assert_eq!(chapter.commits.len(), 1);
        Ok(())
    }

    #[test]
    fn test_lookup_by_name_or_branch() -> Result<()> {
        let repo = sample_course();
        let course = build_graph(&repo)?;

        assert_eq!(course.module("Getting Started")?.branch, "module-intro");
        assert_eq!(course.module("module-intro")?.name, "Getting Started");
        assert!(course.module("Nope").unwrap_err().is_not_found());
        assert!(course
            .chapter("module-intro", "missing")
            .unwrap_err()
            .is_not_found());
        Ok(())
    }

    #[test]
    fn test_key_wraps_after_nine_modules() -> Result<()> {
        let repo = MemoryRepo::new();
        for i in 0..11 {
            repo.branch(&format!("module-m{i:02}"), "main");
        }
        let course = build_graph(&repo)?;

        assert_eq!(course.modules[8].key, Some('9'));
        assert_eq!(course.modules[9].key, Some('0'));
        assert_eq!(course.modules[10].key, None);
        Ok(())
    }

    #[test]
    fn test_context_caches_until_invalidated() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        assert!(!context.is_cached());

        assert_eq!(context.graph()?.modules.len(), 2);
        assert!(context.is_cached());

        context.backend().branch("module-zeta", "main");
        assert_eq!(context.graph()?.modules.len(), 2);

        context.invalidate();
        assert_eq!(context.graph()?.modules.len(), 3);
        Ok(())
    }
}
