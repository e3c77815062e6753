//! Starts and stops the course's shell commands as the navigation state changes.
//!
//! Each [`CommandSpec`] is tracked as a [`RunningCommand`] with an explicit
//! [`ProcessState`]. [`CommandLifecycleManager::reconcile`] brings the set of
//! running children in line with a [`NavigationState`]:
//!
//! 1. reap children that exited on their own
//! 2. stop every running command that no longer matches and wait for it
//! 3. start every idle command that matches
//!
//! A running `refresh` command never matches, so it is stopped and started
//! again on every reconciliation. A `once` command is skipped when the
//! [`RunHistory`] already counts a run for its scope.
//!
//! Output of every child is read line by line on its own thread and written
//! through the shared [`OutputMux`] with a colored `[label]` prefix.
//! Children that exit between navigations are collected by
//! [`CommandLifecycleManager::reap`], which the output loop calls whenever the
//! state watcher idles.

use crate::core::{
    colors::paint_command,
    command_spec::CommandSpec,
    error::{LearnitError, Result},
    state::NavigationState,
    store::JsonStore,
};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Idle,
    Starting,
    Running,
    Stopping,
}

struct MuxInner {
    out: Box<dyn Write + Send>,
    last_blank: bool,
}

/// Serialized, line-oriented writer shared by every child's reader threads.
#[derive(Clone)]
pub struct OutputMux {
    inner: Arc<Mutex<MuxInner>>,
}

impl OutputMux {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MuxInner {
                out,
                last_blank: false,
            })),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn lock(&self) -> MutexGuard<'_, MuxInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self, line: &str, blank: bool) {
        let mut inner = self.lock();
        if blank && inner.last_blank {
            return;
        }
        inner.last_blank = blank;

        if let Err(e) = writeln!(inner.out, "{line}").and_then(|_| inner.out.flush()) {
            log::warn!("Could not write command output: {e}");
        }
    }

    /// Write a line; consecutive blank lines collapse into one.
    pub fn line(&self, text: &str) {
        self.write(text, text.trim().is_empty());
    }

    pub fn prefixed(&self, prefix: &str, text: &str) {
        self.write(&format!("{prefix} {text}"), text.trim().is_empty());
    }
}

pub type HistoryMap = BTreeMap<String, BTreeMap<String, u32>>;

/// Persistent `scope path → command → runs` counters.
pub struct RunHistory {
    store: JsonStore<HistoryMap>,
}

impl RunHistory {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: JsonStore::open(path)?,
        })
    }

    pub fn count(&self, scope: &str, run: &str) -> u32 {
        self.store
            .value()
            .get(scope)
            .and_then(|runs| runs.get(run))
            .copied()
            .unwrap_or(0)
    }

    pub fn increment(&mut self, scope: &str, run: &str) -> Result<u32> {
        self.store.update(|history| {
            let count = history
                .entry(scope.to_string())
                .or_default()
                .entry(run.to_string())
                .or_default();
            *count += 1;
            *count
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.update(|history| history.clear())
    }
}

pub struct RunningCommand {
    pub spec: CommandSpec,
    state: ProcessState,
    child: Option<Child>,
}

impl RunningCommand {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            state: ProcessState::Idle,
            child: None,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn matches(&self, state: &NavigationState) -> bool {
        if self.spec.refresh && self.state == ProcessState::Running {
            return false;
        }
        self.spec.scope.matches(state)
    }

    fn prefix(&self) -> String {
        paint_command(&self.spec.run, &format!("[{}]", self.spec.label())).to_string()
    }
}

#[cfg(windows)]
fn shell_command(run: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", run]);
    command
}

#[cfg(not(windows))]
fn shell_command(run: &str) -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", run]);
    command
}

fn forward_lines(stream: impl Read + Send + 'static, mux: OutputMux, prefix: String) {
    thread::spawn(move || {
        for line in BufReader::new(stream).lines().map_while(|line| line.ok()) {
            mux.prefixed(&prefix, &line);
        }
    });
}

pub struct CommandLifecycleManager {
    commands: Vec<RunningCommand>,
    root: PathBuf,
    mux: OutputMux,
    history: RunHistory,
}

impl CommandLifecycleManager {
    pub fn new(specs: Vec<CommandSpec>, root: &Path, mux: OutputMux, history: RunHistory) -> Self {
        Self {
            commands: specs.into_iter().map(RunningCommand::new).collect(),
            root: root.to_path_buf(),
            mux,
            history,
        }
    }

    pub fn commands(&self) -> &[RunningCommand] {
        &self.commands
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    /// Swap in a new set of specs, stopping everything that was running.
    pub fn replace_specs(&mut self, specs: Vec<CommandSpec>) {
        self.shutdown();
        self.commands = specs.into_iter().map(RunningCommand::new).collect();
    }

    /// Align running commands with `state`. Spawn failures are returned, not raised.
    pub fn reconcile(&mut self, state: &NavigationState) -> Vec<LearnitError> {
        log::debug!("reconcile: {}", state.scope_path());
        self.reap();

        let matching: Vec<bool> = self.commands.iter().map(|c| c.matches(state)).collect();
        for (index, matches) in matching.into_iter().enumerate() {
            if !matches && self.commands[index].state == ProcessState::Running {
                self.stop(index);
            }
        }

        let mut failures = Vec::new();
        for index in 0..self.commands.len() {
            let command = &self.commands[index];
            if command.state != ProcessState::Idle || !command.matches(state) {
                continue;
            }

            let scope = command.spec.scope.path();
            if command.spec.once && self.history.count(&scope, &command.spec.run) >= 1 {
                log::debug!("skipping '{}': already ran for '{scope}'", command.spec.run);
                continue;
            }

            if let Err(e) = self.start(index) {
                failures.push(e);
            }
        }

        failures
    }

    pub fn start(&mut self, index: usize) -> Result<()> {
        let command = &mut self.commands[index];
        if command.state != ProcessState::Idle {
            return Ok(());
        }
        command.state = ProcessState::Starting;

        let cwd = match &command.spec.cwd {
            Some(cwd) => self.root.join(cwd),
            None => self.root.clone(),
        };

        let mut process = shell_command(&command.spec.run);
        process.current_dir(&cwd).stdin(Stdio::null());
        if command.spec.silent {
            process.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            process.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = match process.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::error!("Failed to start '{}' in {}: {e}", command.spec.run, cwd.display());
                command.state = ProcessState::Idle;
                self.mux.line(&format!(
                    "Failed to start: {}",
                    paint_command(&command.spec.run, &command.spec.run)
                ));
                return Err(LearnitError::process_spawn(&command.spec.run, e));
            }
        };

        let prefix = command.prefix();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, self.mux.clone(), prefix.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, self.mux.clone(), prefix);
        }

        log::info!("started '{}' (pid {})", command.spec.run, child.id());
        command.child = Some(child);
        command.state = ProcessState::Running;
        self.mux.line(&format!(
            "Command Starting: {}",
            paint_command(&command.spec.run, &command.spec.run)
        ));

        let scope = command.spec.scope.path();
        let run = command.spec.run.clone();
        if let Err(e) = self.history.increment(&scope, &run) {
            log::warn!("Could not record run of '{run}': {e}");
        }

        Ok(())
    }

    /// Kill the command and wait for it. Stopping an idle command does nothing.
    pub fn stop(&mut self, index: usize) {
        let command = &mut self.commands[index];
        let Some(mut child) = command.child.take() else {
            command.state = ProcessState::Idle;
            return;
        };

        command.state = ProcessState::Stopping;
        log::info!("stopping '{}' (pid {})", command.spec.run, child.id());

        if let Err(e) = child.kill() {
            log::debug!("kill '{}': {e}", command.spec.run);
        }
        if let Err(e) = child.wait() {
            log::warn!("Could not wait for '{}': {e}", command.spec.run);
        }

        command.state = ProcessState::Idle;
    }

    /// Collect commands that exited on their own; returns how many did.
    pub fn reap(&mut self) -> usize {
        let mut exited = 0;
        for command in &mut self.commands {
            let Some(child) = command.child.as_mut() else {
                continue;
            };

            match child.try_wait() {
                Ok(Some(status)) => {
                    let code = status
                        .code()
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    log::info!("'{}' exited with {code}", command.spec.run);
                    self.mux.line(&format!(
                        "Exited with code {code}: {}",
                        paint_command(&command.spec.run, &command.spec.run)
                    ));
                    command.child = None;
                    command.state = ProcessState::Idle;
                    exited += 1;
                }
                Ok(None) => {}
                Err(e) => log::warn!("Could not poll '{}': {e}", command.spec.run),
            }
        }
        exited
    }

    pub fn shutdown(&mut self) {
        for index in 0..self.commands.len() {
            self.stop(index);
        }
    }
}

impl Drop for CommandLifecycleManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
