//! Console output for the navigation and output processes.
//!
//! Errors are red, confirmations green and refusals yellow. Every message is
//! surrounded by blank lines so it stands apart from command output that the
//! output process interleaves with it.

use colored::*;

/// `✕ Error: <message>` framed by blank lines
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Refused moves and degraded operations
pub fn print_warning(message: &str) {
    println!("\n{} {}", "!".yellow(), message.white());
}

pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Title above a menu or listing, e.g. `Getting Started › Basics:`
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white().bold());
}

/// Completed chapters over total, as shown next to a module.
pub fn format_progress(completed: usize, total: usize) -> String {
    format!("({completed}/{total})")
}

/// One menu line: `[key] name`, or indented without a key past the tenth entry.
pub fn format_menu_entry(key: Option<char>, name: &str, detail: &str) -> String {
    let key = match key {
        Some(key) => format!("[{key}]").cyan().bold().to_string(),
        None => "   ".to_string(),
    };
    if detail.is_empty() {
        format!("  {key} {name}")
    } else {
        format!("  {key} {name} {}", detail.bright_black())
    }
}
