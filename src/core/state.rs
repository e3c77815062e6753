//! Navigation state: the logical position matching the current checkout.
//!
//! [`NavigationState`] is what the navigation process publishes and what the
//! output processes react to. Modules and chapters are identified by branch;
//! display names are looked up in the course graph when rendering.
//!
//! # Public API
//! - [`NavigationState`]: `{ course, module?, chapter?, step?, commit? }`
//! - [`Position`]: the state-machine view of a state within its chapter
//! - [`resolve`] / [`resolve_current`]: map a checked-out ref to a state

use crate::core::{
    backend::VersionControl,
    course::{course_name, Course, CourseContext},
    error::Result,
    naming,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub course: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
}

/// Where a state sits in the Module → Chapter → Step hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    AtRoot,
    AtModule,
    AtChapter,
    AtStep(usize),
}

impl NavigationState {
    pub fn root(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            ..Default::default()
        }
    }

    pub fn at_module(course: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            module: Some(module.into()),
            ..Default::default()
        }
    }

    pub fn at_chapter(
        course: impl Into<String>,
        module: impl Into<String>,
        chapter: impl Into<String>,
        commit: Option<String>,
    ) -> Self {
        Self {
            course: course.into(),
            module: Some(module.into()),
            chapter: Some(chapter.into()),
            step: None,
            commit,
        }
    }

    pub fn at_step(
        course: impl Into<String>,
        module: impl Into<String>,
        chapter: impl Into<String>,
        step: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            course: course.into(),
            module: Some(module.into()),
            chapter: Some(chapter.into()),
            step: Some(step.into()),
            commit: Some(commit.into()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.module.is_none()
    }

    /// Whether the optional fields nest correctly.
    pub fn is_consistent(&self) -> bool {
        let chapter_ok = self.chapter.is_none() || self.module.is_some();
        let step_ok = self.step.is_none() || (self.chapter.is_some() && self.commit.is_some());
        chapter_ok && step_ok
    }

    pub fn position(&self, course: &Course) -> Position {
        match (&self.module, &self.chapter) {
            (None, _) => Position::AtRoot,
            (Some(_), None) => Position::AtModule,
            (Some(module), Some(chapter)) => {
                let index = self.commit.as_deref().and_then(|commit| {
                    course
                        .chapter(module, chapter)
                        .ok()
                        .and_then(|c| c.step_index(commit))
                });
                match index {
                    Some(i) if self.step.is_some() => Position::AtStep(i),
                    _ => Position::AtChapter,
                }
            }
        }
    }

    /// `module/chapter/step` path used to key per-location records
    pub fn scope_path(&self) -> String {
        [&self.module, &self.chapter, &self.step]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Human title: the deepest display name available.
    pub fn title(&self, course: &Course) -> String {
        let Some(module) = self.module.as_deref() else {
            return self.course.clone();
        };
        let module_name = course
            .find_module(module)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| naming::module_display_name(module));

        let Some(chapter) = self.chapter.as_deref() else {
            return module_name;
        };
        let chapter_name = course
            .chapter(module, chapter)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| naming::chapter_display_name(chapter));

        match &self.step {
            Some(step) => format!("{module_name} › {chapter_name} › {step}"),
            None => format!("{module_name} › {chapter_name}"),
        }
    }
}

/// Map `current_ref` (a branch name or a raw commit) to a navigation state.
pub fn resolve<B: VersionControl>(
    context: &mut CourseContext<B>,
    current_ref: &str,
) -> Result<NavigationState> {
    let course = course_name(context.backend());

    if current_ref == naming::ROOT_BRANCH {
        return Ok(NavigationState::root(course));
    }

    if naming::is_module_branch(current_ref) {
        return Ok(NavigationState::at_module(course, current_ref));
    }

    let commit = match context.backend().rev_parse(current_ref) {
        Ok(commit) => commit,
        Err(e) => {
            log::warn!("cannot resolve '{current_ref}': {e}");
            return Ok(NavigationState::root(course));
        }
    };

    if let Some((module, _)) = naming::split_chapter_branch(current_ref) {
        return Ok(NavigationState::at_chapter(
            course,
            module,
            current_ref,
            Some(commit),
        ));
    }

    let graph = context.graph()?;

    for module in &graph.modules {
        for chapter in &module.chapters {
            if let Some(step) = chapter.steps.iter().find(|step| step.hash == commit) {
                log::debug!("{commit} is step '{}' of {}", step.label, chapter.branch);
                return Ok(NavigationState::at_step(
                    course,
                    &module.branch,
                    &chapter.branch,
                    &step.label,
                    commit,
                ));
            }

            if chapter.contains_commit(&commit) {
                log::debug!("{commit} is a commit of {}", chapter.branch);
                return Ok(NavigationState::at_chapter(
                    course,
                    &module.branch,
                    &chapter.branch,
                    Some(commit),
                ));
            }
        }
    }

    // A chapter opening with a step starts on the commit its first step builds on
    for module in &graph.modules {
        if let Some(chapter) = module.chapters.iter().find(|c| c.starts_at(&commit)) {
            log::debug!("{commit} is the start of {}", chapter.branch);
            return Ok(NavigationState::at_chapter(
                course,
                &module.branch,
                &chapter.branch,
                Some(commit),
            ));
        }
    }

    log::debug!("{commit} is not part of any chapter");
    Ok(NavigationState::root(course))
}

/// Resolve the position of whatever is checked out right now.
pub fn resolve_current<B: VersionControl>(
    context: &mut CourseContext<B>,
) -> Result<NavigationState> {
    let current_ref = context.backend().current_ref()?;
    resolve(context, &current_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::sample_course;

    #[test]
    fn test_root_branch_resolves_to_root() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let state = resolve(&mut context, "main")?;

        assert!(state.is_root());
        assert_eq!(state.course, "rust-course");
        assert!(!context.is_cached());
        Ok(())
    }

    #[test]
    fn test_module_branch_fast_path() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let state = resolve(&mut context, "module-intro")?;

        assert_eq!(state.module.as_deref(), Some("module-intro"));
        assert_eq!(state.chapter, None);
        assert_eq!(state.commit, None);
        Ok(())
    }

    #[test]
    fn test_chapter_branch_fast_path_has_no_step() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let tip = context.backend().rev_parse("intro-chapter-basics")?;
        let state = resolve(&mut context, "intro-chapter-basics")?;

        assert_eq!(state.module.as_deref(), Some("module-intro"));
        assert_eq!(state.chapter.as_deref(), Some("intro-chapter-basics"));
        assert_eq!(state.step, None);
        assert_eq!(state.commit, Some(tip));
        assert!(!context.is_cached());
        Ok(())
    }

    #[test]
    fn test_every_step_round_trips() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let course = context.graph()?.clone();

        for module in &course.modules {
            for chapter in &module.chapters {
                for step in &chapter.steps {
                    context.backend().checkout(&step.hash)?;
                    let state = resolve_current(&mut context)?;

                    assert_eq!(state.module.as_deref(), Some(module.branch.as_str()));
                    assert_eq!(state.chapter.as_deref(), Some(chapter.branch.as_str()));
                    assert_eq!(state.step.as_deref(), Some(step.label.as_str()));
                    assert_eq!(state.commit.as_deref(), Some(step.hash.as_str()));
                    assert!(state.is_consistent());
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_non_step_chapter_commit_resolves_to_chapter() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let start = context.graph()?.chapter("module-intro", "Basics")?.commits[0]
            .hash
            .clone();

        let state = resolve(&mut context, &start)?;
        assert_eq!(state.chapter.as_deref(), Some("intro-chapter-basics"));
        assert_eq!(state.step, None);
        assert_eq!(state.commit, Some(start));
        Ok(())
    }

    #[test]
    fn test_start_of_chapter_opening_with_a_step() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        // advanced-chapter-async builds directly on main's commit
        let initial = context.backend().rev_parse("main")?;
        assert_eq!(
            context.graph()?.chapter("module-advanced", "Async")?.start,
            Some(initial.clone())
        );

        let state = resolve(&mut context, &initial)?;
        assert_eq!(state.module.as_deref(), Some("module-advanced"));
        assert_eq!(state.chapter.as_deref(), Some("advanced-chapter-async"));
        assert_eq!(state.step, None);
        assert_eq!(state.commit, Some(initial));
        Ok(())
    }

    #[test]
    fn test_unknown_commit_resolves_to_root() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let module_tip = context.backend().rev_parse("module-intro")?;

        assert!(resolve(&mut context, &module_tip)?.is_root());
        assert!(resolve(&mut context, "does-not-exist")?.is_root());
        Ok(())
    }

    #[test]
    fn test_position_and_scope_path() -> Result<()> {
        let mut context = CourseContext::new(sample_course());
        let course = context.graph()?.clone();
        let chapter = course.chapter("module-intro", "Basics")?;
        let second = &chapter.steps[1];

        let state = NavigationState::at_step(
            "rust-course",
            "module-intro",
            "intro-chapter-basics",
            &second.label,
            &second.hash,
        );
        assert_eq!(state.position(&course), Position::AtStep(1));
        assert_eq!(state.scope_path(), "module-intro/intro-chapter-basics/two");
        assert_eq!(state.title(&course), "Getting Started › Basics › two");

        let module = NavigationState::at_module("rust-course", "module-intro");
        assert_eq!(module.position(&course), Position::AtModule);
        assert_eq!(NavigationState::root("x").position(&course), Position::AtRoot);
        assert_eq!(NavigationState::root("x").scope_path(), "");
        Ok(())
    }

    #[test]
    fn test_state_json_shape() -> Result<()> {
        let state = NavigationState::at_chapter("c", "module-a", "a-chapter-b", None);
        let json = serde_json::to_value(&state)?;
        assert_eq!(json["module"], "module-a");
        assert!(json["step"].is_null());

        let parsed: NavigationState = serde_json::from_str(r#"{"course":"c"}"#)?;
        assert!(parsed.is_root());
        Ok(())
    }
}
