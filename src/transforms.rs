//! Region and pixel transforms shared by the item and head renderers
//!
//! Every function here is pure and samples nearest-neighbor, so the hard
//! pixel edges of the source textures survive any scale factor.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Copy the `width`×`height` rectangle at `(x, y)` out of `src`, then scale it.
///
/// Pixels that fall outside `src` read as fully transparent, which is what a
/// 64×32 skin looks like when the 64×64 layout is asked for.
///
/// # Arguments
///
/// * `src` - Source image (sprite sheet or skin texture)
/// * `x`, `y` - Top-left corner of the region in `src`
/// * `width`, `height` - Region size before scaling
/// * `scale` - Uniform scale factor applied after extraction
pub fn extract_region(
    src: &RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    scale: f64,
) -> RgbaImage {
    let mut part = RgbaImage::new(width, height);
    for py in 0..height {
        for px in 0..width {
            let (Some(sx), Some(sy)) = (x.checked_add(px), y.checked_add(py)) else {
                continue;
            };
            if sx < src.width() && sy < src.height() {
                part.put_pixel(px, py, *src.get_pixel(sx, sy));
            }
        }
    }
    resize(&part, scale)
}

/// Scale a whole image by `scale` using nearest-neighbor sampling.
///
/// Output dimensions are `floor(width * scale)` × `floor(height * scale)`.
pub fn resize(src: &RgbaImage, scale: f64) -> RgbaImage {
    let (w, h) = scaled_dimensions(src.width(), src.height(), scale);
    if (w, h) == src.dimensions() {
        return src.clone();
    }
    if w == 0 || h == 0 {
        return RgbaImage::new(w, h);
    }
    imageops::resize(src, w, h, FilterType::Nearest)
}

/// Dimensions of an image of `width`×`height` after scaling by `scale`.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale = scale.max(0.0);
    ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
}

/// Flip an image left-to-right.
pub fn mirror_horizontal(src: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(src)
}

/// Shade an image by multiplying the RGB of every visible pixel by `1 - factor`.
///
/// Alpha is left untouched and fully transparent pixels are skipped, so a
/// face keeps its silhouette. `factor` is clamped to `0.0..=1.0`.
pub fn darken(src: &RgbaImage, factor: f64) -> RgbaImage {
    let keep = 1.0 - factor.clamp(0.0, 1.0);
    let mut dst = src.clone();
    for pixel in dst.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        let Rgba([r, g, b, a]) = *pixel;
        let shade = |c: u8| (c as f64 * keep).round() as u8;
        *pixel = Rgba([shade(r), shade(g), shade(b), a]);
    }
    dst
}

/// Whether any pixel of `src` is less than fully opaque.
pub fn has_transparency(src: &RgbaImage) -> bool {
    src.pixels().any(|p| p[3] < 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 40) as u8, (y * 40) as u8, ((x + y) * 20) as u8, 255])
        })
    }

    #[test]
    fn test_extract_region_copies_rectangle() {
        let src = checker(6, 6);
        let part = extract_region(&src, 2, 3, 2, 2, 1.0);

        assert_eq!(part.dimensions(), (2, 2));
        assert_eq!(part.get_pixel(0, 0), src.get_pixel(2, 3));
        assert_eq!(part.get_pixel(1, 1), src.get_pixel(3, 4));
    }

    #[test]
    fn test_extract_region_out_of_bounds_is_transparent() {
        // A 64x32 skin asked for rows below 32
        let src = RgbaImage::from_pixel(64, 32, Rgba([10, 20, 30, 255]));
        let part = extract_region(&src, 8, 28, 8, 8, 1.0);

        assert_eq!(*part.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*part.get_pixel(0, 4), Rgba([0, 0, 0, 0]));
        assert_eq!(*part.get_pixel(7, 7), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_extract_region_scaled() {
        let src = checker(4, 4);
        let part = extract_region(&src, 0, 0, 2, 2, 3.0);

        assert_eq!(part.dimensions(), (6, 6));
        // Each source pixel becomes a 3x3 block
        assert_eq!(part.get_pixel(0, 0), src.get_pixel(0, 0));
        assert_eq!(part.get_pixel(2, 2), src.get_pixel(0, 0));
        assert_eq!(part.get_pixel(3, 0), src.get_pixel(1, 0));
        assert_eq!(part.get_pixel(5, 5), src.get_pixel(1, 1));
    }

    #[test]
    fn test_resize_fractional_scale_floors_dimensions() {
        let src = checker(8, 8);
        let scaled = resize(&src, 6.4 * 0.95);
        assert_eq!(scaled.dimensions(), (48, 48));
    }

    #[test]
    fn test_resize_keeps_hard_edges() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let scaled = resize(&src, 4.0);
        for pixel in scaled.pixels() {
            assert!(
                *pixel == Rgba([255, 0, 0, 255]) || *pixel == Rgba([0, 0, 255, 255]),
                "nearest-neighbor must not blend colors, got {:?}",
                pixel
            );
        }
    }

    #[test]
    fn test_resize_identity() {
        let src = checker(5, 3);
        assert_eq!(resize(&src, 1.0), src);
    }

    #[test]
    fn test_mirror_horizontal() {
        let src = checker(4, 2);
        let mirrored = mirror_horizontal(&src);

        assert_eq!(mirrored.dimensions(), src.dimensions());
        assert_eq!(mirrored.get_pixel(0, 0), src.get_pixel(3, 0));
        assert_eq!(mirrored.get_pixel(3, 1), src.get_pixel(0, 1));
    }

    #[test]
    fn test_mirror_horizontal_involution() {
        let src = checker(8, 8);
        assert_eq!(mirror_horizontal(&mirror_horizontal(&src)), src);
    }

    #[test]
    fn test_darken_zero_is_identity() {
        let src = checker(8, 8);
        assert_eq!(darken(&src, 0.0), src);
    }

    #[test]
    fn test_darken_one_is_black_with_alpha_preserved() {
        let mut src = checker(3, 3);
        src.put_pixel(1, 1, Rgba([200, 100, 50, 128]));

        let dark = darken(&src, 1.0);
        for (x, y, pixel) in dark.enumerate_pixels() {
            assert_eq!([pixel[0], pixel[1], pixel[2]], [0, 0, 0]);
            assert_eq!(pixel[3], src.get_pixel(x, y)[3]);
        }
    }

    #[test]
    fn test_darken_partial() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 40, 255]));
        let dark = darken(&src, 0.25);
        assert_eq!(*dark.get_pixel(0, 0), Rgba([150, 75, 30, 255]));
    }

    #[test]
    fn test_darken_skips_transparent() {
        let src = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 40, 0]));
        assert_eq!(darken(&src, 0.5), src);
    }

    #[test]
    fn test_has_transparency() {
        let mut src = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        assert!(!has_transparency(&src));

        src.put_pixel(3, 3, Rgba([1, 2, 3, 254]));
        assert!(has_transparency(&src));
    }
}
