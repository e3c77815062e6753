use clap::{Parser, Subcommand};
use learnit::commands::*;
use learnit::core::{error::Result, print_error};
use std::env;

#[derive(Parser)]
#[command(name = "learnit")]
#[command(about = "Navigate a course built from git branches and commits")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules and chapters
    List,
    /// Show the current position in the course
    State {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enter a module by name or branch
    Module { module: String },
    /// Enter a chapter where it was left, or before its first step
    Chapter { module: String, chapter: String },
    /// Go to the next step of the current chapter
    Next,
    /// Go to the previous step of the current chapter
    Prev,
    /// Check out any branch or commit
    Goto { reference: String },
    /// Mark a chapter as completed (the current one by default)
    Complete {
        #[arg(requires = "chapter")]
        module: Option<String>,
        chapter: Option<String>,
    },
    /// Show completed chapters
    Progress { module: Option<String> },
    /// Interactive navigation loop
    Start,
    /// Follow navigation: print step deltas and run course commands
    Output {
        /// Only run commands, do not print deltas
        #[arg(long)]
        no_delta: bool,
        /// Forget which `once` commands already ran
        #[arg(long)]
        reset_history: bool,
    },
    /// Read or change course settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print a setting, or all settings
    Get { key: Option<String> },
    /// Change a setting
    Set { key: String, value: String },
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::List => execute_list(),
        Commands::State { json } => execute_state(json),
        Commands::Module { module } => execute_module(&module),
        Commands::Chapter { module, chapter } => execute_chapter(&module, &chapter),
        Commands::Next => execute_next(),
        Commands::Prev => execute_prev(),
        Commands::Goto { reference } => execute_goto(&reference),
        Commands::Complete { module, chapter } => execute_complete(module.zip(chapter)),
        Commands::Progress { module } => execute_progress(module.as_deref()),
        Commands::Start => execute_start(),
        Commands::Output {
            no_delta,
            reset_history,
        } => execute_output(no_delta, reset_history),
        Commands::Settings { action } => match action {
            SettingsAction::Get { key } => execute_settings_get(key.as_deref()),
            SettingsAction::Set { key, value } => execute_settings_set(&key, &value),
        },
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    if let Err(e) = run(cli.command) {
        log::debug!("{e:?}");
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
