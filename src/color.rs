//! CIE L*a*b* conversion used by the glint pass to find background pixels

use image::Rgba;

/// Channel tolerance when comparing Lab values against zero.
///
/// The D65 conversion of pure black lands within float noise of `(0, 0, 0)`.
const LAB_EPSILON: f64 = 1e-9;

/// A color in L*a*b* space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabColor {
    /// Lightness, 0 to 100
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl LabColor {
    /// Convert an sRGB color under the D65 white point.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r_lin = srgb_to_linear(r as f64 / 255.0);
        let g_lin = srgb_to_linear(g as f64 / 255.0);
        let b_lin = srgb_to_linear(b as f64 / 255.0);

        // linear RGB -> XYZ
        let x = r_lin * 0.4124 + g_lin * 0.3576 + b_lin * 0.1805;
        let y = r_lin * 0.2126 + g_lin * 0.7152 + b_lin * 0.0722;
        let z = r_lin * 0.0193 + g_lin * 0.1192 + b_lin * 0.9505;

        // XYZ -> Lab, relative to the reference white
        let fx = lab_f(x / 0.95047);
        let fy = lab_f(y / 1.00000);
        let fz = lab_f(z / 1.08883);

        Self { l: 116.0 * fy - 16.0, a: 500.0 * (fx - fy), b: 200.0 * (fy - fz) }
    }

    /// Convert the color channels of an RGBA pixel, ignoring alpha.
    pub fn from_rgba(pixel: &Rgba<u8>) -> Self {
        Self::from_rgb(pixel[0], pixel[1], pixel[2])
    }

    /// Whether all three channels are zero, i.e. the color is pure black.
    pub fn is_black(&self) -> bool {
        self.l.abs() < LAB_EPSILON && self.a.abs() < LAB_EPSILON && self.b.abs() < LAB_EPSILON
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}
