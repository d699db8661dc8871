// Configuration loading and parsing (mechtag.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize default config: {message}")]
    DefaultsWriteError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub art: ArtConfig,
}

/// The `[server]` table: where the tagging service lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// The `[art]` table: the third-party card-lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtConfig {
    pub endpoint: String,
    /// Minimum spacing between consecutive lookup requests.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_request_delay_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            art: ArtConfig {
                endpoint: "https://api.scryfall.com/cards/named".to_string(),
                request_delay_ms: default_request_delay_ms(),
            },
        }
    }
}

/// Contents written to `mechtag.toml` on first run.
const DEFAULT_CONFIG_TOML: &str = "\
[server]
# Base URL of the mechanic-tagging service.
base_url = \"http://127.0.0.1:5000\"
timeout_secs = 60

[art]
# Card-lookup endpoint used to resolve card art.
endpoint = \"https://api.scryfall.com/cards/named\"
request_delay_ms = 100
";

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from the given file path.
///
/// This is the lower-level loading primitive that does not write defaults.
/// Prefer `load_config()` which initializes a default file automatically.
pub(crate) fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Write the default `mechtag.toml` to `path` if it does not exist yet.
/// Returns whether a file was written.
pub fn ensure_config_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::DefaultsWriteError {
            message: format!("failed to create {}: {e}", parent.display()),
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| ConfigError::DefaultsWriteError {
        message: format!("failed to write {}: {e}", path.display()),
    })?;
    Ok(true)
}

/// The per-user path of `mechtag.toml`.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", "mechtag").ok_or_else(|| {
        ConfigError::DefaultsWriteError {
            message: "could not determine a config directory for this platform".to_string(),
        }
    })?;
    Ok(dirs.config_dir().join("mechtag.toml"))
}

/// Convenience wrapper: ensures the default config file exists under the
/// user's config directory, then loads it.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_file_path()?;
    ensure_config_file(&path)?;
    load_config_from(&path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.server.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    if config.art.endpoint.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "art.endpoint".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
