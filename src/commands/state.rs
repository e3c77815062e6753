use crate::commands::navigate::{open_navigator, publish_state};
use crate::core::{error::Result, print_section_header, state::Position};
use colored::*;

/// Print where the checkout currently is, republishing it for output processes.
pub fn execute_state(json: bool) -> Result<()> {
    let mut nav = open_navigator()?;
    let state = publish_state(&mut nav)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let course = nav.context().graph()?;
    let position = match state.position(course) {
        Position::AtRoot => "course root".to_string(),
        Position::AtModule => "module".to_string(),
        Position::AtChapter => "chapter start".to_string(),
        Position::AtStep(index) => {
            let total = state
                .module
                .as_deref()
                .zip(state.chapter.as_deref())
                .and_then(|(module, chapter)| course.chapter(module, chapter).ok())
                .map(|chapter| chapter.steps.len())
                .unwrap_or(0);
            format!("step {} of {total}", index + 1)
        }
    };

    print_section_header(&state.title(course));
    println!("  {} {}", "Position:".bright_black(), position);
    if let Some(commit) = &state.commit {
        println!("  {} {}", "Commit:".bright_black(), commit);
    }
    println!();

    Ok(())
}
