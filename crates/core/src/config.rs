//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{PageKind, ViewMode};

/// Directory name under the platform config/data directories.
pub const APP_DIR: &str = "moviedeck";
/// Default movie API host.
pub const DEFAULT_API_BASE_URL: &str = "https://webdev.alphacamp.io";
/// Environment prefix for overrides (e.g. `MOVIEDECK_API_BASE_URL`).
pub const ENV_PREFIX: &str = "MOVIEDECK";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the movie API, without the `/api` suffix.
    pub api_base_url: String,
    /// JSON file emulating browser local storage.
    pub storage_path: PathBuf,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Screen shown at startup.
    pub start_screen: PageKind,
    /// Initial layout of the movie panel.
    pub view_mode: ViewMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: default_storage_path(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            start_screen: PageKind::Browse,
            view_mode: ViewMode::Card,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default(
                "storage_path",
                defaults.storage_path.to_string_lossy().to_string(),
            )?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("start_screen", "browse")?
            .set_default("view_mode", "card")?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Path of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Default location of the local storage file.
pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("storage.json")
}

/// Write a commented default config on first run. Returns the config path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        "# moviedeck configuration\n\
         api_base_url = \"{}\"\n\
         storage_path = {:?}\n\
         request_timeout_secs = {}\n\
         # browse | favorites\n\
         start_screen = \"browse\"\n\
         # card | list\n\
         view_mode = \"card\"\n",
        defaults.api_base_url,
        defaults.storage_path.to_string_lossy(),
        defaults.request_timeout_secs,
    );
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.start_screen, PageKind::Browse);
        assert_eq!(config.view_mode, ViewMode::Card);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"http://localhost:3000\"\n\
             storage_path = \"/tmp/movies.json\"\n\
             start_screen = \"favorites\"\n\
             view_mode = \"list\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/movies.json"));
        assert_eq!(config.start_screen, PageKind::Favorites);
        assert_eq!(config.view_mode, ViewMode::List);
        Ok(())
    }

    #[test]
    fn default_config_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.storage_path, default_storage_path());
        Ok(())
    }
}
