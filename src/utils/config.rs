use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::db::{ConnectionInfo, DEFAULT_EXTENSION};
use crate::error::{Result, RunnerError};

pub const PASSWORD_ENV: &str = "DBMETA_PASSWORD";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionInfo,
    pub scripts_dir: Option<PathBuf>,
    /// Category subdirectories, run in this order
    pub categories: Vec<String>,
    pub extension: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            connection: ConnectionInfo::default(),
            scripts_dir: None,
            categories: vec![
                "domains".to_string(),
                "tables".to_string(),
                "procedures".to_string(),
            ],
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("dbmeta");
            path.push("config.json");
            path
        })
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(err) => warn!("Ignoring config at {}: {err}", path.display()),
                }
            }
        }
        Self::new()
    }

    /// Load an explicitly requested file; errors are reported.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            RunnerError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|err| RunnerError::Config(format!("{}: {err}", path.display())))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Fill the password from the environment when the config has none.
    pub fn resolve_password(&mut self) {
        if self.connection.password.is_empty() {
            if let Ok(password) = std::env::var(PASSWORD_ENV) {
                self.connection.password = password;
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
