use crate::commands::navigate::{describe_location, open_navigator, publish_state};
use crate::core::{
    error::Result,
    navigate::Navigator,
    output::{format_menu_entry, format_progress},
    presence::{Presence, OUTPUT_PRESENCE},
    print_error, print_section_header, print_success, print_warning,
    state::{NavigationState, Position},
    VersionControl,
};
use colored::*;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Next,
    Prev,
    Back,
    Complete,
    Quit,
    Help,
    Select(char),
    Empty,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Input::Empty,
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Prev,
        "b" | "back" => Input::Back,
        "c" | "complete" => Input::Complete,
        "q" | "quit" | "exit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) if key.is_ascii_digit() => Input::Select(key),
                _ => Input::Unknown(line.to_string()),
            }
        }
    }
}

const HELP: &[(&str, &str)] = &[
    ("0-9", "enter the module or chapter with that key"),
    ("n, next", "go to the next step"),
    ("p, prev", "go to the previous step"),
    ("b, back", "go up one level"),
    ("c, complete", "mark the current chapter as completed"),
    ("q, quit", "leave"),
];

fn print_help() {
    print_section_header("Commands");
    for (keys, description) in HELP {
        println!("  {:<14} {}", keys.cyan(), description.bright_black());
    }
    println!();
}

fn print_menu<B: VersionControl>(nav: &mut Navigator<B>, state: &NavigationState) -> Result<()> {
    let course = nav.context().graph()?.clone();
    let title = describe_location(nav, state)?;
    let progress = nav.progress();

    match state.position(&course) {
        Position::AtRoot => {
            print_section_header(&title);
            for module in &course.modules {
                let detail =
                    format_progress(progress.count(&module.branch), module.chapters.len());
                println!("{}", format_menu_entry(module.key, &module.name, &detail));
            }
        }
        Position::AtModule => {
            print_section_header(&title);
            let module = course.module(state.module.as_deref().unwrap_or_default())?;
            for chapter in &module.chapters {
                let completed = progress
                    .record(&module.branch, &chapter.branch)
                    .is_some_and(|record| record.completed);
                let detail = if completed { "✓" } else { "" };
                println!("{}", format_menu_entry(chapter.key, &chapter.name, detail));
            }
        }
        Position::AtChapter => {
            print_section_header(&title);
            println!("  {}", "Type n to begin the first step.".bright_black());
        }
        Position::AtStep(index) => {
            print_section_header(&title);
            let total = state
                .module
                .as_deref()
                .zip(state.chapter.as_deref())
                .and_then(|(module, chapter)| course.chapter(module, chapter).ok())
                .map(|chapter| chapter.steps.len())
                .unwrap_or(0);
            println!(
                "  {}",
                format!("Step {} of {total}", index + 1).bright_black()
            );
        }
    }

    Ok(())
}

fn select<B: VersionControl>(
    nav: &mut Navigator<B>,
    state: &NavigationState,
    key: char,
) -> Result<bool> {
    let course = nav.context().graph()?.clone();

    match state.position(&course) {
        Position::AtRoot => match course.modules.iter().find(|m| m.key == Some(key)) {
            Some(module) => nav.set_module(&module.branch),
            None => Ok(false),
        },
        Position::AtModule => {
            let module = course.module(state.module.as_deref().unwrap_or_default())?;
            match module.chapters.iter().find(|c| c.key == Some(key)) {
                Some(chapter) => nav.set_chapter(&module.branch, &chapter.branch),
                None => Ok(false),
            }
        }
        _ => Ok(false),
    }
}

fn back<B: VersionControl>(nav: &mut Navigator<B>, state: &NavigationState) -> Result<bool> {
    match (&state.module, &state.chapter) {
        (Some(module), Some(_)) => {
            let module = module.clone();
            nav.set_module(&module)
        }
        (Some(_), None) => nav.go_home(),
        (None, _) => Ok(false),
    }
}

/// Apply one line of input; returns `false` when the loop should end.
fn handle<B: VersionControl>(nav: &mut Navigator<B>, input: Input) -> Result<bool> {
    let state = nav.state()?;

    let (moved, refused) = match input {
        Input::Quit => return Ok(false),
        Input::Empty => return Ok(true),
        Input::Help => {
            print_help();
            return Ok(true);
        }
        Input::Unknown(text) => {
            print_warning(&format!("Unknown command '{text}', type h for help"));
            return Ok(true);
        }
        Input::Complete => {
            nav.complete(None)?;
            print_success("Chapter marked as completed");
            return Ok(true);
        }
        Input::Next => (nav.next_step()?, "Already at the last step"),
        Input::Prev => (nav.prev_step()?, "Already at the first step"),
        Input::Back => (back(nav, &state)?, "Already at the course root"),
        Input::Select(key) => (select(nav, &state, key)?, "Nothing to enter with that key"),
    };

    if !moved {
        match nav.last_failure() {
            Some(failure) => print_warning(&failure.to_string()),
            None => print_warning(refused),
        }
    }

    Ok(true)
}

/// Line-driven navigation loop over standard input.
pub fn execute_start() -> Result<()> {
    let mut nav = open_navigator()?;
    let root = nav.backend().root_dir()?;

    if !Presence::check(&root, OUTPUT_PRESENCE) {
        print_warning("No output process is connected. Run `learnit output` in another terminal.");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let state = publish_state(&mut nav)?;
        print_menu(&mut nav, &state)?;

        print!("\n{} ", ">".cyan());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };

        match handle(&mut nav, parse_input(&line?)) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => print_error(&e.to_string()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{course::CourseContext, progress::ProgressTracker, testing::sample_course};
    use tempfile::TempDir;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(" n "), Input::Next);
        assert_eq!(parse_input("PREV"), Input::Prev);
        assert_eq!(parse_input("2"), Input::Select('2'));
        assert_eq!(parse_input("12"), Input::Unknown("12".to_string()));
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("q"), Input::Quit);
    }

    #[test]
    fn test_select_and_back_walk_the_hierarchy() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let progress = ProgressTracker::open_file(temp_dir.path().join("progress.json"))?;
        let mut nav = Navigator::new(CourseContext::new(sample_course()), progress);

        // module-intro sorts second
        assert!(handle(&mut nav, Input::Select('2'))?);
        assert_eq!(nav.position()?, Position::AtModule);

        handle(&mut nav, Input::Select('1'))?;
        assert_eq!(nav.state()?.chapter.as_deref(), Some("intro-chapter-basics"));

        handle(&mut nav, Input::Next)?;
        assert_eq!(nav.position()?, Position::AtStep(0));

        handle(&mut nav, Input::Back)?;
        assert_eq!(nav.position()?, Position::AtModule);
        handle(&mut nav, Input::Back)?;
        assert_eq!(nav.position()?, Position::AtRoot);

        assert!(!handle(&mut nav, Input::Quit)?);
        Ok(())
    }
}
