//! Configuration loading and discovery for `assets.toml`
//!
//! Provides functions to find, load and override configuration.

use super::schema::AssetsConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "assets.toml";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse assets.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// No listen port in the file or the environment
    #[error("No listen port configured: set `port` in assets.toml or the PORT environment variable")]
    MissingPort,
}

/// Find assets.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find assets.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration, then apply environment overrides.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`]; with no file found the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<AssetsConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    let config = match config_path {
        Some(p) => load_config_file(&p)?,
        None => AssetsConfig::default(),
    };
    apply_env(config, |key| env::var(key).ok())
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<AssetsConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AssetsConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Apply environment overrides read through `lookup`.
///
/// `PORT` replaces the configured port.
pub fn apply_env(
    mut config: AssetsConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AssetsConfig, ConfigError> {
    if let Some(value) = lookup(PORT_ENV) {
        match value.trim().parse::<u16>() {
            Ok(port) if port > 0 => config.port = Some(port),
            _ => {
                return Err(ConfigError::Validation(vec![format!(
                    "{}: '{}' is not a valid port",
                    PORT_ENV, value
                )]))
            }
        }
    }
    Ok(config)
}

impl AssetsConfig {
    /// The listen port, required to serve.
    pub fn require_port(&self) -> Result<u16, ConfigError> {
        self.port.ok_or(ConfigError::MissingPort)
    }
}
