use crate::core::error::LearnitError;
use std::path::{Path, PathBuf};

pub fn get_config_directory() -> Result<PathBuf, LearnitError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::home_dir().unwrap_or_default().join(".config")),
        "macos" => dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(LearnitError::CacheDirectoryNotFound)?,
    };

    Ok(base.join("learnit"))
}

/// Per-repository cache directory, keyed by a hash of the repository path.
pub fn get_repo_cache_directory(repo_root: &Path) -> Result<PathBuf, LearnitError> {
    let cache_home = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|_| dirs::cache_dir().ok_or(LearnitError::CacheDirectoryNotFound))?;

    let repo_hash = format!("{:x}", md5::compute(repo_root.to_string_lossy().as_bytes()));

    log::debug!("get_repo_cache_directory: repo_root = {repo_root:?}");
    log::debug!("get_repo_cache_directory: repo_hash = {repo_hash:?}");

    Ok(cache_home.join("learnit").join(repo_hash))
}
