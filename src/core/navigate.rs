//! Navigation state machine that moves the shared checkout.
//!
//! Positions follow [`Position`]: the course root, a module, a chapter boundary
//! (a chapter commit that is not a step) and `AtStep(i)`. Every successful move
//! invalidates the graph cache of the [`CourseContext`] and, when the new
//! position lies inside a chapter, records the commit as the learner's progress.
//!
//! Refused checkouts are not errors: the move returns `false`, the failure is
//! logged and kept in [`Navigator::last_failure`] for the caller to report.

use crate::core::{
    backend::VersionControl,
    course::{Chapter, CourseContext},
    error::{LearnitError, Result},
    naming,
    progress::ProgressTracker,
    state::{resolve_current, NavigationState, Position},
};

pub struct Navigator<B: VersionControl> {
    context: CourseContext<B>,
    progress: ProgressTracker,
    last_failure: Option<LearnitError>,
}

impl<B: VersionControl> Navigator<B> {
    pub fn new(context: CourseContext<B>, progress: ProgressTracker) -> Self {
        Self {
            context,
            progress,
            last_failure: None,
        }
    }

    /// Navigator over `backend` with the progress stored in its working tree.
    pub fn open(backend: B) -> Result<Self> {
        let progress = ProgressTracker::open(&backend.root_dir()?)?;
        Ok(Self::new(CourseContext::new(backend), progress))
    }

    pub fn context(&mut self) -> &mut CourseContext<B> {
        &mut self.context
    }

    pub fn backend(&self) -> &B {
        self.context.backend()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressTracker {
        &mut self.progress
    }

    /// Why the last move was refused, if it was.
    pub fn last_failure(&self) -> Option<&LearnitError> {
        self.last_failure.as_ref()
    }

    pub fn state(&mut self) -> Result<NavigationState> {
        resolve_current(&mut self.context)
    }

    pub fn position(&mut self) -> Result<Position> {
        let state = self.state()?;
        Ok(state.position(self.context.graph()?))
    }

    /// Check out `reference`; `Ok(false)` when the backend refuses.
    pub fn go_to(&mut self, reference: &str) -> Result<bool> {
        log::debug!("go_to: {reference}");

        if let Err(e) = self.context.backend().checkout(reference) {
            log::warn!("Could not move to '{reference}': {e}");
            self.last_failure = Some(e);
            return Ok(false);
        }

        self.last_failure = None;
        self.context.invalidate();

        let state = self.state()?;
        if let (Some(module), Some(chapter), Some(commit)) = (
            state.module.as_deref(),
            state.chapter.as_deref(),
            state.commit.as_deref(),
        ) {
            self.progress.update_commit(module, chapter, commit)?;
        }

        Ok(true)
    }

    pub fn go_home(&mut self) -> Result<bool> {
        self.go_to(naming::ROOT_BRANCH)
    }

    pub fn set_module(&mut self, module: &str) -> Result<bool> {
        let branch = self.context.graph()?.module(module)?.branch.clone();
        self.go_to(&branch)
    }

    /// Enter a chapter where the learner left it, or right before its first step.
    pub fn set_chapter(&mut self, module: &str, chapter: &str) -> Result<bool> {
        let course = self.context.graph()?;
        let module_branch = course.module(module)?.branch.clone();
        let chapter = course.chapter(module, chapter)?;

        let target = match self.progress.last_commit(&module_branch, &chapter.branch) {
            Some(commit) => commit.to_string(),
            None => match chapter.steps.first() {
                Some(first) => format!("{}^", first.hash),
                None => chapter.branch.clone(),
            },
        };

        self.go_to(&target)
    }

    /// The current state and its chapter, when inside one.
    fn current_chapter(&mut self) -> Result<Option<(NavigationState, Chapter)>> {
        let state = self.state()?;
        let (Some(module), Some(chapter)) = (state.module.as_deref(), state.chapter.as_deref())
        else {
            return Ok(None);
        };

        match self.context.graph()?.chapter(module, chapter) {
            Ok(found) => {
                let found = found.clone();
                Ok(Some((state, found)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn current_step_index(state: &NavigationState, chapter: &Chapter) -> Option<usize> {
        state
            .commit
            .as_deref()
            .and_then(|commit| chapter.step_index(commit))
    }

    pub fn next_step(&mut self) -> Result<bool> {
        let Some((state, chapter)) = self.current_chapter()? else {
            return Ok(false);
        };

        let target = match Self::current_step_index(&state, &chapter) {
            _ if chapter.steps.is_empty() => return Ok(false),
            Some(i) if i + 1 < chapter.steps.len() => &chapter.steps[i + 1],
            Some(_) => return Ok(false),
            None => &chapter.steps[0],
        };

        self.go_to(&target.hash)
    }

    pub fn prev_step(&mut self) -> Result<bool> {
        let Some((state, chapter)) = self.current_chapter()? else {
            return Ok(false);
        };

        match Self::current_step_index(&state, &chapter) {
            Some(i) if i > 0 => self.go_to(&chapter.steps[i - 1].hash),
            _ => Ok(false),
        }
    }

    pub fn is_first_step(&mut self) -> Result<bool> {
        Ok(match self.current_chapter()? {
            Some((state, chapter)) => Self::current_step_index(&state, &chapter) == Some(0),
            None => false,
        })
    }

    pub fn is_last_step(&mut self) -> Result<bool> {
        Ok(match self.current_chapter()? {
            Some((state, chapter)) => {
                let last = chapter.steps.len().checked_sub(1);
                last.is_some() && Self::current_step_index(&state, &chapter) == last
            }
            None => false,
        })
    }

    /// Mark a chapter as completed, the current one when none is given.
    pub fn complete(&mut self, target: Option<(&str, &str)>) -> Result<()> {
        let (module, chapter) = match target {
            Some((module, chapter)) => {
                let course = self.context.graph()?;
                let module = course.module(module)?.branch.clone();
                let chapter = course.chapter(&module, chapter)?.branch.clone();
                (module, chapter)
            }
            None => {
                let state = self.state()?;
                match (state.module, state.chapter) {
                    (Some(module), Some(chapter)) => (module, chapter),
                    _ => return Err(LearnitError::NoCurrentChapter),
                }
            }
        };

        self.progress.mark_completed(&module, &chapter)
    }
}
