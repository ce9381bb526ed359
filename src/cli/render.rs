//! Render command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{build_service, fetcher, load_or_exit, runtime, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::AssetsConfig;
use crate::head::{is_valid_scale, MAX_HEAD_SCALE};
use crate::output::{encode_png, is_gif};
use crate::service::AssetService;

/// Default output file for `name`: `.gif` for animations, `.png` otherwise.
fn default_output(name: &str, bytes: &[u8]) -> PathBuf {
    let extension = if is_gif(bytes) { "gif" } else { "png" };
    PathBuf::from(format!("{}.{}", name, extension))
}

fn write_output(path: &Path, bytes: &[u8]) -> ExitCode {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: Cannot create '{}': {}", parent.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    match std::fs::write(path, bytes) {
        Ok(()) => {
            println!("Saved: {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn service_for(config: &AssetsConfig) -> Result<AssetService, ExitCode> {
    build_service(config, fetcher(config)?)
}

/// Run the render item command
pub fn run_render_item(config_path: Option<&Path>, id: &str, output: Option<&Path>, glow: bool) -> ExitCode {
    let config = match load_or_exit(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    rt.block_on(async {
        let service = match service_for(&config) {
            Ok(service) => service,
            Err(code) => return code,
        };

        let key = id.to_uppercase();
        let Some(mut asset) = service.metadata().get(&key) else {
            eprintln!("Error: Unknown item '{}'", key);
            if service.metadata().is_empty() {
                eprintln!("No item snapshot found; run `sba refresh` first");
            }
            return ExitCode::from(EXIT_ERROR);
        };
        if glow {
            asset = asset.with_glow();
        }

        match service.render_asset(&asset).await {
            Ok(bytes) => {
                let path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(&key, &bytes));
                write_output(&path, &bytes)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        }
    })
}

/// Run the render head command
pub fn run_render_head(
    config_path: Option<&Path>,
    texture: &str,
    output: Option<&Path>,
    scale: Option<f64>,
) -> ExitCode {
    let config = match load_or_exit(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let scale = scale.unwrap_or(config.render.head_scale);
    if !is_valid_scale(scale) {
        eprintln!("Error: --scale must be a number in (0, {}]", MAX_HEAD_SCALE);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    rt.block_on(async {
        let service = match service_for(&config) {
            Ok(service) => service.with_head_scale(scale),
            Err(code) => return code,
        };

        let icon = match service.render_head(texture).await {
            Ok(icon) => icon,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        let bytes = match encode_png(&icon) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };

        let path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(texture, &bytes));
        write_output(&path, &bytes)
    })
}
