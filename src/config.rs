//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\scrobble-sync\config.toml
//! - macOS: ~/Library/Application Support/scrobble-sync/config.toml
//! - Linux: ~/.config/scrobble-sync/config.toml
//!
//! CLI flags and environment variables override what is loaded here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// Upstream scrobble server
    pub source: SourceConfig,

    /// Local database
    pub database: DatabaseConfig,

    /// Reconciliation behaviour
    pub sync: SyncConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Spotify client ID for genre and duration lookups
    pub spotify_client_id: Option<String>,

    /// Spotify client secret
    pub spotify_client_secret: Option<String>,
}

/// Upstream scrobble server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maloja server root, e.g. `http://localhost:42010`
    pub maloja_url: Option<String>,

    /// Identifier the sync cursor is stored under
    pub name: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            maloja_url: None,
            name: "maloja".to_string(),
        }
    }
}

/// Local database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file (defaults to `scrobbles.db` in the working directory)
    pub path: Option<PathBuf>,
}

/// What to do when no positive track length can be found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedDuration {
    /// Reject the record
    #[default]
    Skip,
    /// Store the track with `placeholder_secs`
    Placeholder,
}

/// Reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub unresolved_duration: UnresolvedDuration,

    /// Length stored under the placeholder policy (clamped to at least 1)
    pub placeholder_secs: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            unresolved_duration: UnresolvedDuration::Skip,
            placeholder_secs: 1,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scrobble-sync"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    load_from(&path).unwrap_or_else(|e| {
        tracing::error!("{}", e);
        tracing::warn!("Using default configuration");
        Config::default()
    })
}

/// Load configuration from an explicit path
pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

/// Save configuration to an explicit path, atomically
pub fn save_to(config: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write to temp, then rename
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
