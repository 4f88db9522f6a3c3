use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The reference backend binds to port 8001.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8001";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { server_url: None }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mailbucket").join("config.json"))
    }
}

/// Where the client should point: `--server` flag, then the
/// MAILBUCKET_SERVER env var, then the config file, then the default.
pub fn resolve_server_url(flag: Option<&str>) -> String {
    if let Some(url) = flag {
        return url.to_string();
    }

    if let Ok(url) = std::env::var("MAILBUCKET_SERVER") {
        if !url.is_empty() {
            return url;
        }
    }

    let config = Config::load().unwrap_or_else(|_| Config::new());
    config
        .server_url
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}
