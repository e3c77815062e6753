//! File-backed navigation state shared between the navigation and output processes.
//!
//! The writer marks the file as being written with a sibling lock file
//! (`state.json.lock`) for the duration of the write. Readers are driven by
//! filesystem notifications and never read on the first one: they wait for
//! the [`settle`] window to pass without any further notification and without
//! the lock being present, then parse the file.
//!
//! # Public API
//! - [`StateChannel`]: publish and read the shared state
//! - [`StateWatcher`]: blocking iterator of settled states
//! - [`settle`]: the debounce primitive

use crate::core::{
    error::Result,
    state::NavigationState,
    store::{ensure_dir, learnit_dir, read_json, write_json},
};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

pub const STATE_FILE: &str = "state.json";

pub fn state_path(root: &Path) -> PathBuf {
    learnit_dir(root).join(STATE_FILE)
}

pub fn lock_path(state_path: &Path) -> PathBuf {
    let mut name = state_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from(STATE_FILE));
    name.push(".lock");
    state_path.with_file_name(name)
}

#[derive(Debug, Clone)]
pub struct StateChannel {
    path: PathBuf,
}

impl StateChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Channel of the course rooted at `root`.
    pub fn for_course(root: &Path) -> Self {
        Self::new(state_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locked(&self) -> bool {
        lock_path(&self.path).exists()
    }

    pub fn publish(&self, state: &NavigationState) -> Result<()> {
        let lock = lock_path(&self.path);
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        fs::write(&lock, "")?;
        let written = write_json(&self.path, state);
        if let Err(e) = fs::remove_file(&lock) {
            log::warn!("Could not remove {}: {e}", lock.display());
        }

        log::debug!("published state '{}'", state.scope_path());
        written
    }

    pub fn current(&self) -> Result<Option<NavigationState>> {
        read_json(&self.path)
    }
}

/// Block until `window` passes with no event on `events` and `is_locked` false.
///
/// Returns `false` when the sender side is gone.
pub fn settle(events: &Receiver<()>, window: Duration, is_locked: impl Fn() -> bool) -> bool {
    loop {
        match events.recv_timeout(window) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Timeout) if is_locked() => continue,
            Err(RecvTimeoutError::Timeout) => return true,
            Err(RecvTimeoutError::Disconnected) => return false,
        }
    }
}

/// Settled states of a [`StateChannel`], driven by filesystem notifications.
///
/// Notifications can be lost on some platforms; every `poll` interval without
/// one the file is compared with the last delivered value instead.
pub struct StateWatcher {
    channel: StateChannel,
    events: Receiver<()>,
    settle: Duration,
    poll: Duration,
    last: Option<NavigationState>,
    _watcher: RecommendedWatcher,
}

impl StateWatcher {
    pub fn start(channel: StateChannel, settle: Duration, poll: Duration) -> Result<Self> {
        let dir = channel
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        ensure_dir(&dir)?;

        let state_name = channel.path().file_name().map(|n| n.to_os_string());
        let lock_name = lock_path(channel.path())
            .file_name()
            .map(|n| n.to_os_string());

        let (tx, events) = mpsc::channel();
        let mut watcher =
            notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        let relevant = event.paths.iter().any(|path| {
                            let name = path.file_name().map(|n| n.to_os_string());
                            name == state_name || name == lock_name
                        });
                        if relevant {
                            let _ = tx.send(());
                        }
                    }
                    Err(e) => log::warn!("watch error: {e}"),
                }
            })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        log::debug!("watching {}", dir.display());

        let last = channel.current().ok().flatten();
        Ok(Self {
            channel,
            events,
            settle,
            poll,
            last,
            _watcher: watcher,
        })
    }

    /// The state on disk right now.
    pub fn current(&self) -> Result<Option<NavigationState>> {
        self.channel.current()
    }

    /// Next settled state; `None` once the watcher is gone.
    pub fn next(&mut self) -> Result<Option<NavigationState>> {
        self.wait(None)
    }

    /// Next settled state, or `None` when nothing settles within `timeout`.
    pub fn next_timeout(&mut self, timeout: Duration) -> Result<Option<NavigationState>> {
        self.wait(Some(Instant::now() + timeout))
    }

    /// `Some(true)` on a notification or a change seen by polling, `None` when done.
    fn stirred(&mut self, deadline: Option<Instant>) -> Option<bool> {
        let mut wait = self.poll;
        if let Some(deadline) = deadline {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return None;
            }
            wait = wait.min(left);
        }

        match self.events.recv_timeout(wait) {
            Ok(()) => Some(true),
            Err(RecvTimeoutError::Timeout) => {
                let changed = self.channel.current().ok().flatten();
                Some(changed.is_some() && changed != self.last && !self.channel.is_locked())
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn wait(&mut self, deadline: Option<Instant>) -> Result<Option<NavigationState>> {
        loop {
            match self.stirred(deadline) {
                None => return Ok(None),
                Some(false) => continue,
                Some(true) => {}
            }

            let channel = &self.channel;
            if !settle(&self.events, self.settle, || channel.is_locked()) {
                return Ok(None);
            }

            match self.channel.current() {
                Ok(Some(state)) if Some(&state) != self.last.as_ref() => {
                    self.last = Some(state.clone());
                    return Ok(Some(state));
                }
                Ok(_) => log::debug!("settled without a new state"),
                Err(e) => log::debug!("state not readable yet: {e}"),
            }
        }
    }
}
