//! Runtime configuration.
//!
//! Read from `<config dir>/ehb-roadmap/config.json` when present, then
//! overridden by environment variables:
//! - `EHB_ROADMAP_PORT` - HTTP port for `serve`
//! - `EHB_ROADMAP_DB` - SQLite database path
//! - `EHB_ROADMAP_URL` - Base URL used by `search --remote`
//! - `EHB_ROADMAP_SEED` - Seed the built-in roadmap into an empty database (`true`/`false`)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "ehb-roadmap";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PORT: u16 = 17020;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the HTTP API listens on (bound to 127.0.0.1).
    pub port: u16,
    /// Database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Base URL of a running server, including `/api/v1`.
    pub server_url: String,
    /// Seed the built-in roadmap when the database is empty.
    pub seed_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: None,
            server_url: format!("http://localhost:{}/api/v1", DEFAULT_PORT),
            seed_on_start: true,
        }
    }
}

impl Config {
    /// Load the config file and apply environment overrides.
    /// Falls back to defaults if the file is missing or unreadable.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Unparsable values are ignored with a warning.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("EHB_ROADMAP_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid EHB_ROADMAP_PORT: {}", port),
            }
        }
        if let Some(path) = lookup("EHB_ROADMAP_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("EHB_ROADMAP_URL") {
            self.server_url = url;
        }
        if let Some(seed) = lookup("EHB_ROADMAP_SEED") {
            match seed.parse() {
                Ok(seed) => self.seed_on_start = seed,
                Err(_) => tracing::warn!("Ignoring invalid EHB_ROADMAP_SEED: {}", seed),
            }
        }
        self
    }

    /// Save the configuration to the user's config directory.
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let config = Config::default().with_env(env(&[
            ("EHB_ROADMAP_PORT", "8080"),
            ("EHB_ROADMAP_DB", "/tmp/roadmap.db"),
            ("EHB_ROADMAP_SEED", "false"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/roadmap.db")));
        assert!(!config.seed_on_start);
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let config = Config::default().with_env(env(&[("EHB_ROADMAP_PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "port": 9000 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.seed_on_start);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ port: ").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
