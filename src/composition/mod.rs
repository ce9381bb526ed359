//! Canvas composition - drawing images onto a canvas under a transform and blend mode

mod affine;
mod blend;

pub use affine::{draw_image, Affine};
pub use blend::BlendMode;

use image::RgbaImage;

/// Draw `image` onto `canvas` with its top-left corner at `(x, y)`.
pub fn draw_at(canvas: &mut RgbaImage, image: &RgbaImage, x: f64, y: f64, mode: BlendMode) {
    draw_image(canvas, image, Affine::IDENTITY, x, y, mode);
}

/// Draw `image` stretched over the whole canvas, nearest-neighbor.
pub fn draw_stretched(canvas: &mut RgbaImage, image: &RgbaImage, mode: BlendMode) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let sx = canvas.width() as f64 / image.width() as f64;
    let sy = canvas.height() as f64 / image.height() as f64;
    draw_image(canvas, image, Affine::new([sx, 0.0, 0.0, sy, 0.0, 0.0]), 0.0, 0.0, mode);
}
