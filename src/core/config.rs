use crate::core::dirs::{get_config_directory, get_repo_cache_directory};
use crate::core::error::LearnitError;
use crate::core::store::learnit_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User-level settings shared by every course.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LearnitConfig {
    /// Quiet window before a changed state file is read
    pub settle_ms: u64,
    /// Fallback poll interval of the state watcher
    pub poll_ms: u64,
    /// Keep command run history in the cache dir rather than in `.learnit/`
    pub history_in_cache: bool,
}

impl Default for LearnitConfig {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            poll_ms: 250,
            history_in_cache: true,
        }
    }
}

impl LearnitConfig {
    pub fn load_or_create() -> Result<Self, LearnitError> {
        Self::load_or_create_in(&get_config_directory()?)
    }

    pub fn load_or_create_in(config_dir: &Path) -> Result<Self, LearnitError> {
        let config_file = config_dir.join("config.json");

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_in(config_dir)?;
            Ok(config)
        }
    }

    pub fn save_in(&self, config_dir: &Path) -> Result<(), LearnitError> {
        std::fs::create_dir_all(config_dir)?;

        let config_file = config_dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_file, content)?;

        Ok(())
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    /// Where the command run history of the course at `root` lives.
    pub fn history_path(&self, root: &Path) -> Result<PathBuf, LearnitError> {
        let dir = if self.history_in_cache {
            get_repo_cache_directory(root)?
        } else {
            learnit_dir(root)
        };
        Ok(dir.join("history.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_or_create_writes_defaults() -> Result<(), LearnitError> {
        let temp_dir = TempDir::new()?;
        let config = LearnitConfig::load_or_create_in(temp_dir.path())?;

        assert_eq!(config, LearnitConfig::default());
        assert!(temp_dir.path().join("config.json").exists());
        assert_eq!(config.settle(), Duration::from_millis(100));
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<(), LearnitError> {
        let temp_dir = TempDir::new()?;
        std::fs::write(temp_dir.path().join("config.json"), r#"{"settle_ms": 40}"#)?;

        let config = LearnitConfig::load_or_create_in(temp_dir.path())?;
        assert_eq!(config.settle_ms, 40);
        assert_eq!(config.poll_ms, 250);
        assert!(config.history_in_cache);
        Ok(())
    }

    #[test]
    fn test_history_path_outside_cache() -> Result<(), LearnitError> {
        let config = LearnitConfig {
            history_in_cache: false,
            ..Default::default()
        };
        assert_eq!(
            config.history_path(Path::new("/c"))?,
            PathBuf::from("/c/.learnit/history.json")
        );
        Ok(())
    }
}
