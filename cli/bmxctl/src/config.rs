//! Configuration and credential storage.
//!
//! Both live as JSON files in the platform config directory
//! (`~/.config/bmx` on Linux).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bmx_client::DEFAULT_API_URL;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "butterflymx", "bmx")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Read a JSON file, or `None` if it does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value =
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))?;

    debug!(path = ?path, "Loaded file");
    Ok(Some(value))
}

/// Write a JSON file readable only by the owner.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = serde_json::to_string_pretty(value)?;

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {:?}", path))?;
        file.write_all(contents.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }

    Ok(())
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);
        Ok(read_json(&path)?.unwrap_or_default())
    }

    /// Get the API URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Stored credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// API token.
    pub token: String,

    /// When the token was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

impl Credentials {
    /// Create new credentials.
    pub fn new(token: String) -> Self {
        Self {
            token,
            saved_at: Some(chrono::Utc::now()),
        }
    }

    /// Load credentials from disk.
    pub fn load() -> Result<Option<Self>> {
        read_json(&Self::path()?)
    }

    /// Save credentials to disk.
    pub fn save(&self) -> Result<()> {
        write_json(&Self::path()?, self)
    }

    /// Delete credentials from disk. Returns false if none were stored.
    pub fn delete() -> Result<bool> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete credentials at {:?}", path))?;
        Ok(true)
    }

    /// Path of the credentials file.
    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CREDENTIALS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bmxctl-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_config_missing_api_url_uses_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_read_missing_file() {
        let value: Option<Config> = read_json(&scratch_path("missing.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_credentials_round_trip_through_file() {
        let path = scratch_path("credentials.json");
        let creds = Credentials::new("meowmeow".to_string());

        write_json(&path, &creds).unwrap();
        let loaded: Credentials = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded.token, "meowmeow");
        assert_eq!(loaded.saved_at, creds.saved_at);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials::new("meowmeow".to_string());
        assert!(!format!("{creds:?}").contains("meowmeow"));
    }
}
