use crate::commands::navigate::open_navigator;
use crate::core::{error::Result, output::format_menu_entry, print_section_header};
use colored::*;

/// Completed chapters per module, or per chapter within one module.
pub fn execute_progress(module: Option<&str>) -> Result<()> {
    let mut nav = open_navigator()?;
    let course = nav.context().graph()?.clone();
    let progress = nav.progress();

    let Some(module) = module else {
        print_section_header("Progress");
        for module in &course.modules {
            let detail = format!(
                "{}/{} chapters",
                progress.count(&module.branch),
                module.chapters.len()
            );
            println!("{}", format_menu_entry(module.key, &module.name, &detail));
        }
        println!();
        return Ok(());
    };

    let module = course.module(module)?;
    let current = progress.current_incomplete(&module.branch);
    print_section_header(&module.name);

    for chapter in &module.chapters {
        let record = progress.record(&module.branch, &chapter.branch);
        let status = match record {
            Some(record) if record.completed => match record.completed_at {
                Some(at) => format!(
                    "completed {}",
                    at.with_timezone(&chrono::Local).format("%Y-%m-%d")
                )
                .green(),
                None => "completed".green(),
            },
            Some(_) if current == Some(chapter.branch.as_str()) => "in progress".yellow(),
            Some(_) => "started".yellow(),
            None => "not started".bright_black(),
        };
        println!(
            "{}",
            format_menu_entry(chapter.key, &chapter.name, &status.to_string())
        );
    }
    println!();

    Ok(())
}
