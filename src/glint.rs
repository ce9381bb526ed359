//! Enchantment glint - animates an overlay over a static icon
//!
//! Every overlay frame in the glint directory is screen-blended over the
//! icon. Pixels that were black in the icon (which includes everything fully
//! transparent) are cleared afterwards, so the glint never spills outside the
//! icon's silhouette.

use glob::glob;
use image::RgbaImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::color::LabColor;
use crate::composition::{draw_at, draw_stretched, BlendMode};
use crate::gif::{encode_gif, GifOptions};
use crate::output::OutputError;

/// Error generating a glint animation
#[derive(Debug, Error)]
pub enum GlintError {
    /// The glint directory could not be turned into a glob pattern
    #[error("Invalid glint directory {dir}: {source}")]
    Pattern { dir: String, source: glob::PatternError },
    /// An overlay frame could not be read or decoded
    #[error("Failed to load glint frame {path}: {source}")]
    Frame { path: String, source: image::ImageError },
    /// The glint directory holds no overlay frames
    #[error("No glint frames found in {dir}")]
    NoFrames { dir: String },
    /// The animation could not be encoded
    #[error("Failed to encode glint animation: {0}")]
    Encode(#[from] OutputError),
}

/// List the overlay frames of `dir` in filename order.
pub fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, GlintError> {
    let pattern = dir.join("*.png");
    let entries = glob(&pattern.to_string_lossy()).map_err(|source| GlintError::Pattern {
        dir: dir.display().to_string(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).filter(|p| p.is_file()).collect();
    paths.sort();
    Ok(paths)
}

/// Load every overlay frame of `dir`, in filename order.
pub fn load_frames(dir: &Path) -> Result<Vec<RgbaImage>, GlintError> {
    let paths = frame_paths(dir)?;
    if paths.is_empty() {
        return Err(GlintError::NoFrames { dir: dir.display().to_string() });
    }

    paths
        .iter()
        .map(|path| {
            image::open(path).map(|img| img.to_rgba8()).map_err(|source| GlintError::Frame {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}

/// Composite one overlay frame over `base`.
pub fn glint_frame(base: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut frame = RgbaImage::new(base.width(), base.height());
    draw_at(&mut frame, base, 0.0, 0.0, BlendMode::Screen);

    let background: Vec<bool> =
        frame.pixels().map(|p| LabColor::from_rgba(p).is_black()).collect();

    draw_stretched(&mut frame, overlay, BlendMode::Screen);

    for (pixel, clear) in frame.pixels_mut().zip(background) {
        if clear {
            *pixel = image::Rgba([0, 0, 0, 0]);
        }
    }
    frame
}

/// Composite every overlay frame over `base`, keeping overlay order.
pub fn glint_frames(base: &RgbaImage, overlays: &[RgbaImage]) -> Vec<RgbaImage> {
    overlays.par_iter().map(|overlay| glint_frame(base, overlay)).collect()
}

/// Glint generator bound to a directory of overlay frames.
#[derive(Debug, Clone)]
pub struct Glint {
    dir: PathBuf,
    options: GifOptions,
}

impl Glint {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), options: GifOptions::default() }
    }

    /// Animate `base` with the current overlay frames and encode it as a GIF.
    ///
    /// Frames are listed from disk on every call.
    pub fn apply(&self, base: &RgbaImage) -> Result<Vec<u8>, GlintError> {
        let overlays = load_frames(&self.dir)?;
        debug!(frames = overlays.len(), dir = %self.dir.display(), "Generating glint");
        let frames = glint_frames(base, &overlays);
        Ok(encode_gif(&frames, self.options)?)
    }
}
