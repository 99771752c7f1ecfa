use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::ANONYMOUS_SENDER;

/// Directory holding the board database, session token, and config.
pub const PROJECT_DIR: &str = ".talkboard";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to the project directory unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_min_secret_len")]
    pub min_secret_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_secret_len: default_min_secret_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Sender name recorded when a message arrives without one.
    #[serde(default = "default_anonymous_label")]
    pub anonymous_label: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            anonymous_label: default_anonymous_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

impl ProjectConfig {
    /// Absolute database path for a board rooted at `project_root`.
    #[must_use]
    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            project_root.join(PROJECT_DIR).join(&self.store.path)
        }
    }
}

/// Load `.talkboard/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("talkboard").join(CONFIG_FILE);
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Walk up from `start` to the nearest directory containing `.talkboard/`.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Text written by `tb init`.
#[must_use]
pub fn default_config_toml() -> String {
    format!(
        "[store]\npath = \"{}\"\n\n[auth]\nmin_secret_len = {}\n\n[voice]\nanonymous_label = \"{}\"\n",
        default_store_path().display(),
        default_min_secret_len(),
        default_anonymous_label(),
    )
}

fn default_store_path() -> PathBuf {
    PathBuf::from("board.sqlite3")
}

const fn default_min_secret_len() -> usize {
    6
}

fn default_anonymous_label() -> String {
    ANONYMOUS_SENDER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.auth.min_secret_len, 6);
        assert_eq!(config.voice.anonymous_label, "Anonymous");
        assert_eq!(
            config.store_path(dir.path()),
            dir.path().join(".talkboard/board.sqlite3")
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(
            dir.path().join(".talkboard/config.toml"),
            "[auth]\nmin_secret_len = 10\n",
        )
        .expect("write");

        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config.auth.min_secret_len, 10);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join(PROJECT_DIR)).expect("mkdir");
        std::fs::write(dir.path().join(".talkboard/config.toml"), "[auth\n").expect("write");

        let err = load_project_config(dir.path()).expect_err("parse failure");
        assert!(err.to_string().contains("Failed to parse"), "{err}");
    }

    #[test]
    fn default_config_text_parses_back() {
        let parsed: ProjectConfig = toml::from_str(&default_config_toml()).expect("parse");
        assert_eq!(parsed, ProjectConfig::default());
    }

    #[test]
    fn project_root_is_found_from_subdirectory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join(PROJECT_DIR)).expect("mkdir");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir nested");
        assert_eq!(find_project_root(&nested), Some(dir.path().to_path_buf()));
    }
}
