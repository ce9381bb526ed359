//! Isometric head icons from 64×64 / 64×32 skin textures
//!
//! A head is an 8×8×8 cube: six faces are cut from the skin's head region,
//! shaded to fake a fixed light source, and skewed into an isometric diamond.
//! Skins with a transparent hat region also get the six hat faces drawn on a
//! slightly larger cube around the head.
//!
//! Three canvases are built and stacked bottom to top:
//!
//! 1. hat background - the hat faces hidden behind the head (left, back, bottom)
//! 2. head - the base cube, drawn at [`HAT_FACTOR`] of the full size and centered
//! 3. hat - the visible hat faces (top, front, right)

use image::RgbaImage;

use crate::composition::{draw_at, draw_image, Affine, BlendMode};
use crate::transforms::{darken, extract_region, has_transparency, mirror_horizontal};

/// Skew constant of the isometric projection.
pub const SKEW_A: f64 = 26.0 / 45.0;
/// Vertical stretch paired with [`SKEW_A`].
pub const SKEW_B: f64 = SKEW_A * 2.0;
/// Size of the head cube relative to the hat cube.
pub const HAT_FACTOR: f64 = 0.94;
/// Scale used by the asset host: a 128×118 icon.
pub const DEFAULT_HEAD_SCALE: f64 = 6.4;
/// Largest accepted scale (a 1280×1184 icon).
pub const MAX_HEAD_SCALE: f64 = 64.0;

/// Icon width in cube units.
const ICON_WIDTH: f64 = 20.0;
/// Icon height in cube units.
const ICON_HEIGHT: f64 = 18.5;
/// Edge length of one head face in the skin texture.
const FACE_SIZE: u32 = 8;
/// Nudge keeping hat front/back faces from z-fighting with the top.
const HAT_FACE_NUDGE: f64 = 0.5;

/// Texture ids of accessories, which render without a hat back panel.
pub const ACCESSORIES: [&str; 4] = [
    "5c577e7d31e5e04c2ce71e13e3962192d80bd54b55efaacaaea12966fe27bf9",
    "eaa44b170d749ce4099aa78d98945d193651484089efb87ba88892c6fed2af31",
    "651eb16f22dd7505be5dae06671803633a5abf8b2beeb5c60548670df0e59214",
    "317b51e086f201448a4b45b0b91e97faf4d1739071480be6d5cab0a054512164",
];

/// Whether `texture_id` is an accessory.
pub fn is_accessory(texture_id: &str) -> bool {
    ACCESSORIES.contains(&texture_id)
}

/// Whether `scale` is a finite number in `(0, MAX_HEAD_SCALE]`.
pub fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0 && scale <= MAX_HEAD_SCALE
}

/// Pixel dimensions of a head icon rendered at `scale`.
pub fn icon_dimensions(scale: f64) -> (u32, u32) {
    ((ICON_WIDTH * scale) as u32, (ICON_HEIGHT * scale) as u32)
}

/// The two skin layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Head cube, skin region (0, 0)-(32, 16)
    Base,
    /// Hat cube, skin region (32, 0)-(64, 16)
    Hat,
}

impl Layer {
    fn texture_offset(self) -> u32 {
        match self {
            Layer::Base => 0,
            Layer::Hat => 32,
        }
    }
}

/// The six faces of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    Right,
    Front,
    Left,
    Back,
}

impl Face {
    /// Top-left corner of this face in the skin texture.
    pub fn texture_origin(self, layer: Layer) -> (u32, u32) {
        let (u, v) = match self {
            Face::Top => (8, 0),
            Face::Bottom => (16, 0),
            Face::Right => (0, 8),
            Face::Front => (8, 8),
            Face::Left => (16, 8),
            Face::Back => (24, 8),
        };
        (u + layer.texture_offset(), v)
    }

    /// How much the face is darkened.
    pub fn shade(self) -> f64 {
        match self {
            Face::Top | Face::Left => 0.0,
            Face::Right => 0.15,
            Face::Front => 0.25,
            Face::Bottom | Face::Back => 0.3,
        }
    }

    /// Back and left are viewed from the inside of the cube.
    pub fn mirrored(self) -> bool {
        matches!(self, Face::Back | Face::Left)
    }

    /// The plane the face is projected onto.
    pub fn plane(self) -> Plane {
        match self {
            Face::Top | Face::Bottom => Plane::Horizontal,
            Face::Front | Face::Back => Plane::Facing,
            Face::Right | Face::Left => Plane::Side,
        }
    }
}

/// Projection planes of the isometric cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Top and bottom faces
    Horizontal,
    /// Front and back faces
    Facing,
    /// Right and left faces
    Side,
}

impl Plane {
    /// Skew matrix of the plane.
    pub fn matrix(self) -> Affine {
        match self {
            Plane::Horizontal => Affine::new([1.0, -SKEW_A, 1.0, SKEW_A, 0.0, 0.0]),
            Plane::Facing => Affine::new([1.0, -SKEW_A, 0.0, SKEW_B, 0.0, SKEW_A]),
            Plane::Side => Affine::new([1.0, SKEW_A, 0.0, SKEW_B, 0.0, 0.0]),
        }
    }

    /// Where a face anchored at isometric `(x, y, z)` is drawn, in the
    /// plane's own coordinates.
    pub fn draw_origin(self, x: f64, y: f64, z: f64) -> (f64, f64) {
        match self {
            Plane::Horizontal => (y - z, x + z),
            Plane::Facing => (y + x, x + z),
            Plane::Side => (x + y, z - y),
        }
    }
}

/// Draw one face at isometric position `(x, 0, z)`.
pub fn draw_face(canvas: &mut RgbaImage, texture: &RgbaImage, plane: Plane, x: f64, z: f64) {
    let (dx, dy) = plane.draw_origin(x, 0.0, z);
    draw_image(canvas, texture, plane.matrix(), dx, dy, BlendMode::Normal);
}

/// Cut, scale, mirror and shade one face out of the skin.
fn face_texture(skin: &RgbaImage, face: Face, layer: Layer, scale: f64) -> RgbaImage {
    let (u, v) = face.texture_origin(layer);
    let mut texture = extract_region(skin, u, v, FACE_SIZE, FACE_SIZE, scale);
    if face.mirrored() {
        texture = mirror_horizontal(&texture);
    }
    darken(&texture, face.shade())
}

/// Whether the skin carries a hat layer: any transparency in its hat region.
pub fn has_hat_layer(skin: &RgbaImage) -> bool {
    has_transparency(&extract_region(skin, 32, 0, 32, 32, 1.0))
}

/// Placement of a face relative to the cube anchor, in cube edges.
struct Placement {
    face: Face,
    /// Shift along x by this many edges
    x_edges: f64,
    /// Shift along z by this many edges
    z_edges: f64,
    /// Extra z shift in pixels
    z_nudge: f64,
}

const fn place(face: Face, x_edges: f64, z_edges: f64, z_nudge: f64) -> Placement {
    Placement { face, x_edges, z_edges, z_nudge }
}

/// Hat faces behind the head, in draw order.
const HAT_BACKGROUND: [Placement; 3] = [
    place(Face::Left, 1.0, -1.0, 0.0),
    place(Face::Back, 0.0, 0.0, -HAT_FACE_NUDGE),
    place(Face::Bottom, 0.0, 1.0, 0.0),
];

/// Hat faces in front of the head, in draw order.
const HAT_FOREGROUND: [Placement; 3] = [
    place(Face::Top, 0.0, 0.0, 0.0),
    place(Face::Front, 1.0, 0.0, -HAT_FACE_NUDGE),
    place(Face::Right, 0.0, 0.0, 0.0),
];

/// Head faces, in draw order.
const HEAD: [Placement; 6] = [
    place(Face::Bottom, 0.0, 1.0, 0.0),
    place(Face::Left, 1.0, -1.0, 0.0),
    place(Face::Back, 0.0, 0.0, 0.0),
    place(Face::Top, 0.0, 0.0, 0.0),
    place(Face::Front, 1.0, 0.0, 0.0),
    place(Face::Right, 0.0, 0.0, 0.0),
];

/// Anchor of the cube in isometric coordinates and the pixel length of one
/// cube edge.
#[derive(Debug, Clone, Copy)]
struct CubeFrame {
    x_offset: f64,
    z_offset: f64,
    edge: f64,
}

impl CubeFrame {
    fn position(&self, placement: &Placement) -> (f64, f64) {
        (
            self.x_offset + placement.x_edges * self.edge,
            self.z_offset + placement.z_edges * self.edge + placement.z_nudge,
        )
    }
}

fn draw_placements<'a>(
    canvas: &mut RgbaImage,
    skin: &RgbaImage,
    layer: Layer,
    texture_scale: f64,
    frame: CubeFrame,
    placements: impl IntoIterator<Item = &'a Placement>,
) {
    for placement in placements {
        let texture = face_texture(skin, placement.face, layer, texture_scale);
        let (x, z) = frame.position(placement);
        draw_face(canvas, &texture, placement.face.plane(), x, z);
    }
}

/// Compose the isometric icon of a head.
///
/// Output is always [`icon_dimensions`]`(scale)`, whether or not the skin has
/// a hat layer. Accessories (see [`ACCESSORIES`]) skip the hat back panel.
pub fn compose_head(skin: &RgbaImage, texture_id: &str, scale: f64) -> RgbaImage {
    let (width, height) = icon_dimensions(scale);
    let mut canvas = RgbaImage::new(width, height);
    let mut hat = RgbaImage::new(width, height);
    let mut hat_background = RgbaImage::new(width, height);
    let mut head = RgbaImage::new((ICON_WIDTH * scale * HAT_FACTOR) as u32, height);

    let x_offset = scale * 2.0;
    let z_offset = scale * 3.0;

    if has_hat_layer(skin) {
        let frame = CubeFrame { x_offset, z_offset, edge: FACE_SIZE as f64 * scale };
        let accessory = is_accessory(texture_id);
        let background = HAT_BACKGROUND
            .iter()
            .filter(|p| !(accessory && p.face == Face::Back));
        draw_placements(&mut hat_background, skin, Layer::Hat, scale, frame, background);
        draw_placements(&mut hat, skin, Layer::Hat, scale, frame, &HAT_FOREGROUND);
    }

    let head_scale = scale * HAT_FACTOR;
    let frame = CubeFrame { x_offset, z_offset, edge: FACE_SIZE as f64 * head_scale };
    draw_placements(&mut head, skin, Layer::Base, scale * (HAT_FACTOR + 0.01), frame, &HEAD);

    let inset_x = (head_scale * ICON_WIDTH - head_scale * ICON_WIDTH * HAT_FACTOR) / 2.0;
    let inset_y = (head_scale * ICON_HEIGHT - head_scale * ICON_HEIGHT * HAT_FACTOR) / 2.0;

    draw_at(&mut canvas, &hat_background, 0.0, 0.0, BlendMode::Normal);
    draw_at(&mut canvas, &head, inset_x, inset_y, BlendMode::Normal);
    draw_at(&mut canvas, &hat, 0.0, 0.0, BlendMode::Normal);

    canvas
}
