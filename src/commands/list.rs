use crate::commands::navigate::open_navigator;
use crate::core::{
    error::Result,
    output::{format_menu_entry, format_progress},
    print_info, print_section_header,
    progress::ProgressTracker,
    Course,
};
use colored::*;

/// Lines of the course outline, marking completed chapters.
pub fn format_outline(course: &Course, progress: &ProgressTracker) -> Vec<String> {
    let mut lines = Vec::new();

    for module in &course.modules {
        let detail = format_progress(progress.count(&module.branch), module.chapters.len());
        lines.push(format_menu_entry(module.key, &module.name, &detail));

        for chapter in &module.chapters {
            let completed = progress
                .record(&module.branch, &chapter.branch)
                .is_some_and(|record| record.completed);
            let mark = if completed {
                "✓".green().to_string()
            } else {
                " ".to_string()
            };
            let steps = match chapter.steps.len() {
                1 => "1 step".to_string(),
                n => format!("{n} steps"),
            };
            lines.push(format!(
                "    {mark} {} {}",
                chapter.name,
                format!("({steps})").bright_black()
            ));
        }
    }

    lines
}

pub fn execute_list() -> Result<()> {
    let mut nav = open_navigator()?;
    let course = nav.context().graph()?.clone();

    if course.modules.is_empty() {
        print_info("No modules found. Modules live on branches named module-<name>.");
        return Ok(());
    }

    print_section_header(&course.name);
    for line in format_outline(&course, nav.progress()) {
        println!("{line}");
    }
    println!();

    Ok(())
}
