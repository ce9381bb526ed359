//! Item sprite sheet - locates item icons inside one large sheet image
//!
//! The sheet ships with a stylesheet of rules like
//!
//! ```css
//! .icon-1_0, .icon-1_0-alt { background-position: -128px -256px; }
//! ```
//!
//! Each rule's selectors name an `icon-{item_id}_{damage}` class and its first
//! declaration holds the cell origin. Origins are stored as absolute pixel
//! offsets of a fixed 128×128 cell.

use image::RgbaImage;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

use crate::transforms::extract_region;

/// Edge length of one item cell in the sheet.
pub const ITEM_CELL_SIZE: u32 = 128;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").unwrap());
static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());

/// Error loading the sprite sheet or its stylesheet
#[derive(Debug, Error)]
pub enum SpriteSheetError {
    /// The stylesheet could not be read
    #[error("Failed to read sprite stylesheet {path}: {source}")]
    Stylesheet { path: String, source: std::io::Error },
    /// The sheet image could not be opened or decoded
    #[error("Failed to load sprite sheet {path}: {source}")]
    Image { path: String, source: image::ImageError },
}

/// One parsed stylesheet rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRule {
    /// Selectors of the rule, trimmed (e.g. `.icon-1_0`)
    pub selectors: Vec<String>,
    /// Absolute pixel origin from the first declaration
    pub origin: (u32, u32),
}

/// Parsed selector → origin rules, in stylesheet order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<SpriteRule>,
}

impl RuleTable {
    /// Parse a stylesheet.
    ///
    /// Parsing never fails: rules without declarations or with unreadable
    /// values get the origin `(0, 0)`.
    pub fn parse(css: &str) -> Self {
        let css = COMMENT.replace_all(css, "");
        let rules = RULE
            .captures_iter(&css)
            .filter_map(|caps| {
                let selectors: Vec<String> = caps[1]
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if selectors.is_empty() {
                    return None;
                }
                Some(SpriteRule { selectors, origin: parse_origin(&caps[2]) })
            })
            .collect();
        Self { rules }
    }

    /// All parsed rules in stylesheet order.
    pub fn rules(&self) -> &[SpriteRule] {
        &self.rules
    }

    /// Origin of the cell for `item_id` / `damage`.
    ///
    /// The first rule listing `.icon-{item_id}_{damage}` wins. Items without a
    /// rule fall back to `(0, 0)` so callers always get an icon.
    pub fn locate(&self, item_id: i64, damage: i64) -> (u32, u32) {
        let selector = format!(".icon-{}_{}", item_id, damage);
        self.rules
            .iter()
            .find(|rule| rule.selectors.iter().any(|s| *s == selector))
            .map(|rule| rule.origin)
            .unwrap_or((0, 0))
    }
}

/// Read the origin out of a declaration block: the first declaration's value,
/// split on whitespace, each token's leading integer made absolute.
fn parse_origin(block: &str) -> (u32, u32) {
    let Some(value) = block
        .split(';')
        .map(str::trim)
        .find(|decl| !decl.is_empty())
        .and_then(|decl| decl.split_once(':'))
        .map(|(_, value)| value)
    else {
        return (0, 0);
    };

    let mut coords = value.split_whitespace().map(parse_offset);
    let x = coords.next().unwrap_or(0);
    let y = coords.next().unwrap_or(0);
    (x, y)
}

fn parse_offset(token: &str) -> u32 {
    LEADING_INT
        .find(token)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .and_then(|v| u32::try_from(v.unsigned_abs()).ok())
        .unwrap_or(0)
}

/// The item sheet image together with its rule table.
///
/// Loaded once at startup and shared read-only between renders.
#[derive(Debug, Clone)]
pub struct ItemSheet {
    image: RgbaImage,
    rules: RuleTable,
}

impl ItemSheet {
    pub fn new(image: RgbaImage, rules: RuleTable) -> Self {
        Self { image, rules }
    }

    /// Load the sheet image and its stylesheet from disk.
    pub fn load(image_path: &Path, css_path: &Path) -> Result<Self, SpriteSheetError> {
        let css = std::fs::read_to_string(css_path).map_err(|source| {
            SpriteSheetError::Stylesheet { path: css_path.display().to_string(), source }
        })?;
        let image = image::open(image_path)
            .map_err(|source| SpriteSheetError::Image {
                path: image_path.display().to_string(),
                source,
            })?
            .to_rgba8();
        Ok(Self::new(image, RuleTable::parse(&css)))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Render the flat icon of an item: its 128×128 cell, unscaled.
    pub fn render_item(&self, item_id: i64, damage: i64) -> RgbaImage {
        let (x, y) = self.rules.locate(item_id, damage);
        extract_region(&self.image, x, y, ITEM_CELL_SIZE, ITEM_CELL_SIZE, 1.0)
    }
}
