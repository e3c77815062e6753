//! Per-course settings kept in the repository config under `learnit.main.<key>`.
//!
//! Values are stored JSON-encoded so booleans survive the round trip through
//! the string-typed config store.

use crate::core::{
    backend::VersionControl,
    diff::MarkdownStyle,
    error::{LearnitError, Result},
    naming,
};

const BOOLEAN: &[&str] = &["true", "false"];

/// Known keys with their defaults
pub const SETTINGS: &[(&str, bool)] = &[
    ("diffs.staged", false),
    ("markdown.active", true),
    ("markdown.symbols", false),
];

fn config_key(key: &str) -> String {
    format!("learnit.{}.{key}", naming::ROOT_BRANCH)
}

fn default_for(key: &str) -> Result<bool> {
    SETTINGS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, default)| *default)
        .ok_or_else(|| LearnitError::invalid_setting(key))
}

pub struct CourseSettings<'a, B: VersionControl + ?Sized> {
    backend: &'a B,
}

impl<'a, B: VersionControl + ?Sized> CourseSettings<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn get(&self, key: &str) -> Result<bool> {
        let default = default_for(key)?;
        let Some(raw) = self.backend.get_config(&config_key(key))? else {
            return Ok(default);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Ignoring malformed setting {key}={raw}: {e}");
                Ok(default)
            }
        }
    }

    /// Validate `value` (`true`/`false`) and store it.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        default_for(key)?;
        let parsed: bool = value
            .trim()
            .parse()
            .map_err(|_| LearnitError::invalid_setting_value(key, value, BOOLEAN))?;

        self.backend
            .set_config(&config_key(key), &serde_json::to_string(&parsed)?)
    }

    pub fn all(&self) -> Result<Vec<(&'static str, bool)>> {
        SETTINGS
            .iter()
            .map(|(key, _)| Ok((*key, self.get(key)?)))
            .collect()
    }

    pub fn markdown_style(&self) -> Result<MarkdownStyle> {
        Ok(MarkdownStyle {
            active: self.get("markdown.active")?,
            symbols: self.get("markdown.symbols")?,
        })
    }
}
