//! Unified color system for command prefixes and diff lines.
//!
//! Command output is prefixed with a label whose color is derived from the
//! command text, so the same command keeps its color across restarts and
//! processes.
//!
//! # Public API
//! - [`color_index`]: stable palette index of a command string
//! - [`command_color`] / [`paint_command`]: color a command or its prefix
//! - [`get_change_color_style`]: color function for a diff line kind

use crate::core::diff::Change;
use colored::*;

/// Command palette, indexed by [`color_index`]
pub const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::BrightBlack,
];

/// Fold the UTF-16 units of `text` into a palette index, seeded with the unit count.
pub fn color_index(text: &str) -> usize {
    let units: Vec<u16> = text.encode_utf16().collect();
    units
        .iter()
        .fold(units.len(), |n, &unit| (n * 59 + unit as usize) % PALETTE.len())
}

pub fn command_color(run: &str) -> Color {
    PALETTE[color_index(run)]
}

/// `text` in the color of the command `run`
pub fn paint_command(run: &str, text: &str) -> ColoredString {
    text.color(command_color(run))
}

/// Single function to apply color styling to a diff line
pub fn get_change_color_style(change: Change) -> Box<dyn Fn(&str) -> ColoredString> {
    match change {
        Change::Context => Box::new(|text: &str| text.normal()),
        Change::Added => Box::new(|text: &str| text.green()),
        Change::Removed => Box::new(|text: &str| text.red()),
    }
}
