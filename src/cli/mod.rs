//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod render;
mod serve;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::cache::AssetCache;
use crate::config::{load_config, AssetsConfig};
use crate::fetch::HttpFetcher;
use crate::glint::Glint;
use crate::metadata::{EssenceTable, ItemMetadataTable};
use crate::service::AssetService;
use crate::spritesheet::ItemSheet;
use crate::store::FileStore;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Skyblock asset host - serves item icons, glinting variants and isometric heads
#[derive(Parser)]
#[command(name = "sba")]
#[command(about = "Skyblock asset host - renders and serves item and head icons")]
#[command(version)]
pub struct Cli {
    /// Path to assets.toml (default: search upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server with metadata refresh and store eviction
    Serve,

    /// Render one asset to a file, bypassing the store
    Render {
        #[command(subcommand)]
        target: RenderTarget,
    },

    /// Fetch item metadata once and write the snapshot
    Refresh,

    /// Remove every stored render
    ClearStore,
}

#[derive(Subcommand)]
pub enum RenderTarget {
    /// Render an item from the local metadata snapshot
    Item {
        /// Item id (case-insensitive)
        id: String,

        /// Output file (default: {ID}.png or {ID}.gif)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add the enchantment glint
        #[arg(long)]
        glow: bool,
    },

    /// Render a head from a skin texture id
    Head {
        /// Skin texture id
        texture: String,

        /// Output file (default: {texture}.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Head scale (default: render.head_scale from the config)
        #[arg(long)]
        scale: Option<f64>,
    },
}

/// Run the CLI and return the process exit code.
pub fn run() -> ExitCode {
    crate::logging::init();
    install_panic_hook();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve => serve::run_serve(config_path),
        Commands::Render { target: RenderTarget::Item { id, output, glow } } => {
            render::run_render_item(config_path, &id, output.as_deref(), glow)
        }
        Commands::Render { target: RenderTarget::Head { texture, output, scale } } => {
            render::run_render_head(config_path, &texture, output.as_deref(), scale)
        }
        Commands::Refresh => serve::run_refresh(config_path),
        Commands::ClearStore => serve::run_clear_store(config_path),
    }
}

/// Unexpected faults are logged and end the process; a supervisor restarts it.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(panic = %info, "Unrecoverable error");
        std::process::exit(EXIT_ERROR as i32);
    }));
}

/// Load and validate the configuration, reporting failures as invalid args.
pub(crate) fn load_or_exit(path: Option<&Path>) -> Result<AssetsConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Multi-threaded runtime for commands that talk to the network or disk.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().map_err(|e| {
        eprintln!("Error: failed to start runtime: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// HTTP client for the configured remote endpoints.
pub(crate) fn fetcher(config: &AssetsConfig) -> Result<Arc<HttpFetcher>, ExitCode> {
    HttpFetcher::new(
        &config.remote.items_url,
        &config.remote.texture_url,
        Duration::from_secs(config.remote.timeout_secs),
    )
    .map(Arc::new)
    .map_err(|e| {
        eprintln!("Error: failed to build HTTP client: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Assemble the asset service from the configured static inputs.
///
/// The metadata table is seeded from the snapshot file when one exists. A
/// missing essence file leaves the essence table empty.
pub(crate) fn build_service(
    config: &AssetsConfig,
    fetcher: Arc<HttpFetcher>,
) -> Result<AssetService, ExitCode> {
    let paths = &config.paths;
    let sheet = ItemSheet::load(&paths.items_sheet, &paths.items_css).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;

    let essences = EssenceTable::load(&paths.essences).unwrap_or_else(|e| {
        warn!(error = %e, "Essence table unavailable");
        EssenceTable::default()
    });

    let metadata = Arc::new(ItemMetadataTable::new(Some(paths.items_snapshot.clone())));
    metadata.load_snapshot();

    Ok(AssetService::new(
        sheet,
        Glint::new(&paths.glint_dir),
        AssetCache::new(FileStore::new(&paths.store_dir)),
        metadata,
        essences,
        fetcher,
    )
    .with_head_scale(config.render.head_scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_item() {
        let cli = Cli::try_parse_from(["sba", "render", "item", "enchanted_book", "--glow", "-o", "book.gif"])
            .expect("should parse");
        match cli.command {
            Commands::Render { target: RenderTarget::Item { id, output, glow } } => {
                assert_eq!(id, "enchanted_book");
                assert_eq!(output, Some(PathBuf::from("book.gif")));
                assert!(glow);
            }
            _ => panic!("expected render item"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["sba", "serve", "--config", "/etc/assets.toml"]).expect("should parse");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/assets.toml")));
        assert!(matches!(cli.command, Commands::Serve));
    }

    #[test]
    fn test_parse_clear_store() {
        let cli = Cli::try_parse_from(["sba", "clear-store"]).expect("should parse");
        assert!(matches!(cli.command, Commands::ClearStore));
    }
}
