//! Configuration schema types for `assets.toml`
//!
//! Defines the structure and validation rules for the asset host configuration.
//! Every section is optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fetch::{DEFAULT_ITEMS_URL, DEFAULT_TEXTURE_URL, DEFAULT_TIMEOUT};
use crate::head::{is_valid_scale, DEFAULT_HEAD_SCALE, MAX_HEAD_SCALE};

/// Upper bound for timeouts and job periods: one year.
pub const MAX_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Item sprite sheet image
    pub items_sheet: PathBuf,
    /// Stylesheet locating items in the sheet
    pub items_css: PathBuf,
    /// Directory of glint overlay frames
    pub glint_dir: PathBuf,
    /// Directory of rendered assets
    pub store_dir: PathBuf,
    /// Persisted item metadata snapshot
    pub items_snapshot: PathBuf,
    /// Essence id → texture id mapping
    pub essences: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            items_sheet: PathBuf::from("public/items.png"),
            items_css: PathBuf::from("public/items.css"),
            glint_dir: PathBuf::from("public/glint"),
            store_dir: PathBuf::from("store"),
            items_snapshot: PathBuf::from("data/items.json"),
            essences: PathBuf::from("data/essence.json"),
        }
    }
}

/// Remote endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Item metadata endpoint
    pub items_url: String,
    /// Skin texture endpoint prefix; the texture id is appended
    pub texture_url: String,
    /// Timeout for any remote request, in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            items_url: DEFAULT_ITEMS_URL.to_string(),
            texture_url: DEFAULT_TEXTURE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Background job periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between metadata refreshes
    pub refresh_secs: u64,
    /// Seconds between store evictions
    pub evict_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { refresh_secs: 120, evict_secs: 2 * 24 * 60 * 60 }
    }
}

/// Render settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Head icon scale
    pub head_scale: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { head_scale: DEFAULT_HEAD_SCALE }
    }
}

/// Root configuration structure for assets.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Listen port; required to serve
    pub port: Option<u16>,
    pub paths: PathsConfig,
    pub remote: RemoteConfig,
    pub schedule: ScheduleConfig,
    pub render: RenderConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "schedule.refresh_secs")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assets.toml: '{}' {}", self.field, self.message)
    }
}

impl AssetsConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut error = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if self.port == Some(0) {
            error("port", "must be between 1 and 65535");
        }

        for (field, url) in
            [("remote.items_url", &self.remote.items_url), ("remote.texture_url", &self.remote.texture_url)]
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                error(field, "must be an http(s) URL");
            }
        }

        let period_message = format!("must be an integer in 1..={}", MAX_PERIOD_SECS);
        for (field, secs) in [
            ("remote.timeout_secs", self.remote.timeout_secs),
            ("schedule.refresh_secs", self.schedule.refresh_secs),
            ("schedule.evict_secs", self.schedule.evict_secs),
        ] {
            if secs == 0 || secs > MAX_PERIOD_SECS {
                error(field, &period_message);
            }
        }

        if !is_valid_scale(self.render.head_scale) {
            error("render.head_scale", &format!("must be a number in (0, {}]", MAX_HEAD_SCALE));
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
