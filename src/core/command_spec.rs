//! Shell commands attached to points of the course.
//!
//! Authors store commands as a JSON array under the config key
//! `learnit.<branch>.commands`. Where the array lives decides its scope: on
//! `main` the commands run everywhere, on a module branch inside that module and
//! on a chapter branch inside that chapter. Chapter entries may narrow further
//! to a single step with `"step": "<label>"`.

use crate::core::{
    backend::VersionControl,
    course::Course,
    error::Result,
    naming,
    state::NavigationState,
};
use serde::{Deserialize, Serialize};

/// One entry of a `learnit.<branch>.commands` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCommand {
    pub run: String,
    #[serde(default)]
    pub refresh: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub once: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

/// Where in the course a command applies. Module and chapter are branches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub module: Option<String>,
    pub chapter: Option<String>,
    pub step: Option<String>,
}

impl Scope {
    pub fn matches(&self, state: &NavigationState) -> bool {
        let Some(module) = &self.module else {
            return true;
        };
        if state.module.as_ref() != Some(module) {
            return false;
        }

        let Some(chapter) = &self.chapter else {
            return true;
        };
        if state.chapter.as_ref() != Some(chapter) {
            return false;
        }

        match &self.step {
            Some(step) => state.step.as_ref() == Some(step),
            None => true,
        }
    }

    /// `module/chapter/step`, empty for unscoped commands
    pub fn path(&self) -> String {
        [&self.module, &self.chapter, &self.step]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Most specific part of the scope
    pub fn label(&self) -> Option<&str> {
        self.step
            .as_deref()
            .or(self.chapter.as_deref())
            .or(self.module.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub run: String,
    pub cwd: Option<String>,
    pub prefix: Option<String>,
    pub refresh: bool,
    pub silent: bool,
    pub once: bool,
    pub scope: Scope,
}

impl CommandSpec {
    pub fn new(run: impl Into<String>, scope: Scope) -> Self {
        Self {
            run: run.into(),
            cwd: None,
            prefix: None,
            refresh: false,
            silent: false,
            once: false,
            scope,
        }
    }

    fn from_stored(stored: StoredCommand, mut scope: Scope) -> Self {
        if scope.chapter.is_some() {
            scope.step = stored.step;
        }
        Self {
            run: stored.run,
            cwd: stored.cwd,
            prefix: stored.prefix,
            refresh: stored.refresh,
            silent: stored.silent,
            once: stored.once,
            scope,
        }
    }

    /// Output prefix: the explicit prefix, else the scope, else `course`.
    pub fn label(&self) -> &str {
        self.prefix
            .as_deref()
            .or_else(|| self.scope.label())
            .unwrap_or("course")
    }
}

pub fn commands_key(branch: &str) -> String {
    format!("learnit.{branch}.commands")
}

/// Commands stored on one branch; malformed arrays are skipped with a warning.
pub fn stored_commands<B: VersionControl + ?Sized>(
    backend: &B,
    branch: &str,
) -> Result<Vec<StoredCommand>> {
    let Some(raw) = backend.get_config(&commands_key(branch))? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(commands) => Ok(commands),
        Err(e) => {
            log::warn!("Ignoring malformed commands on '{branch}': {e}");
            Ok(Vec::new())
        }
    }
}

pub fn save_commands<B: VersionControl + ?Sized>(
    backend: &B,
    branch: &str,
    commands: &[StoredCommand],
) -> Result<()> {
    backend.set_config(&commands_key(branch), &serde_json::to_string(commands)?)
}

/// Every command of the course with its scope filled in.
pub fn load_command_specs<B: VersionControl + ?Sized>(
    backend: &B,
    course: &Course,
) -> Result<Vec<CommandSpec>> {
    let mut specs: Vec<CommandSpec> = stored_commands(backend, naming::ROOT_BRANCH)?
        .into_iter()
        .map(|stored| CommandSpec::from_stored(stored, Scope::default()))
        .collect();

    for module in &course.modules {
        let scope = Scope {
            module: Some(module.branch.clone()),
            ..Default::default()
        };
        specs.extend(
            stored_commands(backend, &module.branch)?
                .into_iter()
                .map(|stored| CommandSpec::from_stored(stored, scope.clone())),
        );

        for chapter in &module.chapters {
            let scope = Scope {
                module: Some(module.branch.clone()),
                chapter: Some(chapter.branch.clone()),
                step: None,
            };
            specs.extend(
                stored_commands(backend, &chapter.branch)?
                    .into_iter()
                    .map(|stored| CommandSpec::from_stored(stored, scope.clone())),
            );
        }
    }

    log::debug!("loaded {} command specs", specs.len());
    Ok(specs)
}
