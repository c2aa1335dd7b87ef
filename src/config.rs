// User configuration for the tasktrack CLI

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "tasktrack";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_DB_FILE: &str = "tasks.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the tasks table
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Default location: `<config_dir>/tasktrack/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the config file at the default location, if any
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Pick the database file: explicit override, then config, then the data dir
    pub fn resolve_db_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_override {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(DEFAULT_DB_FILE))
            .ok_or_else(|| eyre::eyre!("Could not determine a data directory; pass --db"))
    }
}
