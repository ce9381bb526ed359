//! Animated GIF encoding

use crate::output::OutputError;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

/// Encoder settings for an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    /// Delay per frame in milliseconds
    pub delay_ms: u32,
    /// Quantizer speed, 1 (best) to 30 (fastest)
    pub speed: i32,
    /// Loop forever instead of playing once
    pub looping: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { delay_ms: 50, speed: 30, looping: true }
    }
}

/// Encode a sequence of frames as an animated GIF.
///
/// Fully transparent pixels stay transparent in every frame. An empty frame
/// list yields an empty buffer.
pub fn encode_gif(frames: &[RgbaImage], options: GifOptions) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    if frames.is_empty() {
        return Ok(bytes);
    }

    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, options.speed.clamp(1, 30));
        let repeat = if options.looping { Repeat::Infinite } else { Repeat::Finite(0) };
        encoder.set_repeat(repeat)?;

        let delay = Delay::from_numer_denom_ms(options.delay_ms, 1);
        for frame in frames {
            encoder.encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))?;
        }
    }

    Ok(bytes)
}
