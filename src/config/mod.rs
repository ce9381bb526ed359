//! Configuration for the asset host
//!
//! Provides types and loading for `assets.toml`.

pub mod loader;
pub mod schema;

pub use loader::{apply_env, find_config, find_config_from, load_config, ConfigError, CONFIG_FILE, PORT_ENV};
pub use schema::*;
