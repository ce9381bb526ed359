//! Blend modes used when drawing one image onto a canvas

use image::Rgba;

/// Blend modes for canvas draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha compositing (source over destination)
    #[default]
    Normal,
    /// Lightens underlying colors: result = 1 - (1 - base) * (1 - blend)
    Screen,
}

impl BlendMode {
    /// Apply blend mode to a single color channel (values are 0.0-1.0)
    pub(crate) fn blend_channel(&self, base: f32, blend: f32) -> f32 {
        match self {
            BlendMode::Normal => blend,
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - blend),
        }
    }
}

/// Blend source pixel over destination using the specified blend mode.
///
/// The blended color only applies where the destination is visible; over a
/// transparent destination the source color is used as-is, then the result is
/// composited with porter-duff "source over".
pub(crate) fn blend_pixels(src: &Rgba<u8>, dst: &Rgba<u8>, mode: BlendMode) -> Rgba<u8> {
    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| -> u8 {
        let s = src[i] as f32 / 255.0;
        let d = dst[i] as f32 / 255.0;
        let mixed = (1.0 - dst_alpha) * s + dst_alpha * mode.blend_channel(d, s);
        let result = (mixed * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([channel(0), channel(1), channel(2), (out_alpha * 255.0).round() as u8])
}
