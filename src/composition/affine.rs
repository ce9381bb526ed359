//! 2-D affine transforms and transformed image draws

use image::RgbaImage;

use super::blend::{blend_pixels, BlendMode};

/// A 2-D affine matrix in canvas order `[a, b, c, d, e, f]`:
///
/// ```text
/// x' = a*x + c*y + e
/// y' = b*x + d*y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine::new([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Build a matrix from its six canvas coefficients.
    pub const fn new(m: [f64; 6]) -> Self {
        Self { a: m[0], b: m[1], c: m[2], d: m[3], e: m[4], f: m[5] }
    }

    /// Map a point through the matrix.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// The inverse matrix, or `None` if the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

/// Draw `image` onto `canvas` at `(dx, dy)` in the space of `transform`.
///
/// Mirrors a canvas `drawImage` under `setTransform`: the rectangle
/// `(dx, dy, width, height)` is mapped through `transform`, and every canvas
/// pixel whose center lands inside it takes the nearest source pixel. No
/// smoothing is applied.
pub fn draw_image(
    canvas: &mut RgbaImage,
    image: &RgbaImage,
    transform: Affine,
    dx: f64,
    dy: f64,
    mode: BlendMode,
) {
    let (width, height) = (image.width() as f64, image.height() as f64);
    if width == 0.0 || height == 0.0 {
        return;
    }
    let Some(inverse) = transform.invert() else {
        return;
    };

    // Bounding box of the transformed rectangle, clipped to the canvas
    let corners = [
        transform.apply(dx, dy),
        transform.apply(dx + width, dy),
        transform.apply(dx, dy + height),
        transform.apply(dx + width, dy + height),
    ];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor().max(0.0);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor().max(0.0);
    let max_x = corners
        .iter()
        .map(|c| c.0)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(canvas.width() as f64);
    let max_y = corners
        .iter()
        .map(|c| c.1)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(canvas.height() as f64);
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    for py in min_y as u32..max_y as u32 {
        for px in min_x as u32..max_x as u32 {
            let (ux, uy) = inverse.apply(px as f64 + 0.5, py as f64 + 0.5);
            let (u, v) = (ux - dx, uy - dy);
            if u < 0.0 || v < 0.0 || u >= width || v >= height {
                continue;
            }
            let src = image.get_pixel(u as u32, v as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = canvas.get_pixel(px, py);
            let blended = blend_pixels(src, dst, mode);
            canvas.put_pixel(px, py, blended);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn assert_point_eq(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_apply() {
        let m = Affine::new([1.0, 0.5, 1.0, 2.0, 3.0, 4.0]);
        assert_point_eq(m.apply(2.0, 1.0), (6.0, 7.0));
    }

    #[test]
    fn test_invert_round_trip() {
        let k = 26.0 / 45.0;
        let m = Affine::new([1.0, -k, 0.0, 2.0 * k, 0.0, k]);
        let inv = m.invert().unwrap();

        let (x, y) = m.apply(13.0, -7.5);
        assert_point_eq(inv.apply(x, y), (13.0, -7.5));
    }

    #[test]
    fn test_invert_singular() {
        let m = Affine::new([1.0, 2.0, 2.0, 4.0, 0.0, 0.0]);
        assert!(m.invert().is_none());
    }

    #[test]
    fn test_draw_identity_at_offset() {
        let mut canvas = RgbaImage::new(4, 4);
        let image = RgbaImage::from_pixel(2, 2, RED);

        draw_image(&mut canvas, &image, Affine::IDENTITY, 1.0, 1.0, BlendMode::Normal);

        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(1, 1), RED);
        assert_eq!(*canvas.get_pixel(2, 2), RED);
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_clips_to_canvas() {
        let mut canvas = RgbaImage::new(3, 3);
        let image = RgbaImage::from_pixel(4, 4, RED);

        draw_image(&mut canvas, &image, Affine::IDENTITY, -2.0, 1.0, BlendMode::Normal);

        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(0, 1), RED);
        assert_eq!(*canvas.get_pixel(1, 2), RED);
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_vertical_shear() {
        // y' = x + y: each column slides down by its x
        let mut canvas = RgbaImage::new(4, 6);
        let image = RgbaImage::from_pixel(3, 1, RED);

        draw_image(&mut canvas, &image, Affine::new([1.0, 1.0, 0.0, 1.0, 0.0, 0.0]), 0.0, 0.0, BlendMode::Normal);

        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(1, 1), RED);
        assert_eq!(*canvas.get_pixel(2, 2), RED);
        assert_eq!(*canvas.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_singular_is_noop() {
        let mut canvas = RgbaImage::new(2, 2);
        let image = RgbaImage::from_pixel(2, 2, RED);

        draw_image(&mut canvas, &image, Affine::new([0.0; 6]), 0.0, 0.0, BlendMode::Normal);

        assert!(canvas.pixels().all(|p| p[3] == 0));
    }
}
