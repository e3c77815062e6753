use crate::core::{
    channel::{StateChannel, StateWatcher},
    command_spec::load_command_specs,
    config::LearnitConfig,
    course::CourseContext,
    diff::{show_delta, MarkdownStyle},
    error::Result,
    git::GitRepo,
    lifecycle::{CommandLifecycleManager, OutputMux, RunHistory},
    presence::{Presence, OUTPUT_PRESENCE},
    print_info, print_success,
    settings::CourseSettings,
    state::{resolve_current, NavigationState},
    VersionControl,
};
use std::io::{self, IsTerminal};

const DEFAULT_WIDTH: usize = 80;

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|columns| columns.parse().ok())
        .filter(|&width| width > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

fn clear_screen() {
    if io::stdout().is_terminal() {
        print!("\x1B[2J\x1B[H");
    }
}

fn show<B: VersionControl>(
    backend: &B,
    state: &NavigationState,
    manager: &mut CommandLifecycleManager,
    delta: Option<MarkdownStyle>,
) {
    if let Some(style) = delta {
        clear_screen();
        for line in show_delta(backend, state, style, terminal_width()) {
            println!("{line}");
        }
    }

    for failure in manager.reconcile(state) {
        log::warn!("{failure}");
    }
}

/// Follow the navigation state: print each step's delta and run the course commands.
pub fn execute_output(no_delta: bool, reset_history: bool) -> Result<()> {
    let config = LearnitConfig::load_or_create()?;
    let repo = GitRepo::open_current()?;
    let root = repo.root_dir()?;

    let mut history = RunHistory::open(config.history_path(&root)?)?;
    if reset_history {
        history.clear()?;
        print_success("Command history cleared");
    }

    let delta = if no_delta {
        None
    } else {
        Some(CourseSettings::new(&repo).markdown_style()?)
    };

    let mut context = CourseContext::new(repo);
    let course = context.graph()?.clone();
    let specs = load_command_specs(context.backend(), &course)?;
    let mut manager = CommandLifecycleManager::new(specs, &root, OutputMux::stdout(), history);

    let channel = StateChannel::for_course(&root);
    let mut watcher = StateWatcher::start(channel, config.settle(), config.poll())?;
    let _presence = Presence::connect(&root, OUTPUT_PRESENCE)?;

    let initial = match watcher.current()? {
        Some(state) => state,
        None => resolve_current(&mut context)?,
    };
    print_info("Waiting for navigation changes. Press Ctrl-C to stop.");
    show(context.backend(), &initial, &mut manager, delta);

    // Commands are stopped when the manager drops
    loop {
        match watcher.next_timeout(config.poll())? {
            Some(state) => {
                log::debug!("state changed: {}", state.scope_path());
                show(context.backend(), &state, &mut manager, delta);
            }
            None => {
                manager.reap();
            }
        }
    }
}
