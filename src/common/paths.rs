//! Configuration and fixture paths

use std::io;
use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "petfriends-api-tests";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/petfriends-api-tests/`
/// - macOS: `~/Library/Application Support/petfriends-api-tests/`
/// - Windows: `%APPDATA%\petfriends-api-tests\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = config_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

/// Resolve a fixture file name against the fixtures directory
///
/// Absolute paths are returned unchanged.
pub fn resolve_fixture(fixtures_dir: &Path, name: &Path) -> PathBuf {
    if name.is_absolute() {
        name.to_path_buf()
    } else {
        fixtures_dir.join(name)
    }
}
