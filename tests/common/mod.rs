//! Shared fixture: an asset service over in-memory sources and a temp directory

#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use skyblock_assets::cache::AssetCache;
use skyblock_assets::fetch::{FetchError, TextureSource};
use skyblock_assets::glint::Glint;
use skyblock_assets::metadata::{EssenceTable, ItemMetadataTable, ItemTable};
use skyblock_assets::models::{HeadAsset, ItemAsset, SkyblockAsset};
use skyblock_assets::output::save_png;
use skyblock_assets::service::AssetService;
use skyblock_assets::spritesheet::{ItemSheet, RuleTable};
use skyblock_assets::store::FileStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const HEAD_TEXTURE: &str = "cafebabe";
pub const GLINT_FRAMES: usize = 3;

/// Skin source that counts fetches and can be told to fail.
pub struct MockTextures {
    skin: RgbaImage,
    fetches: AtomicUsize,
    fail: bool,
    delay: Duration,
}

impl MockTextures {
    pub fn new() -> Self {
        Self { skin: test_skin(), fetches: AtomicUsize::new(0), fail: false, delay: Duration::ZERO }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::new() }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextureSource for MockTextures {
    async fn fetch_skin(&self, _texture_id: &str) -> Result<RgbaImage, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(FetchError::Status { url: "http://textures/skin".to_string(), status: 502 });
        }
        Ok(self.skin.clone())
    }
}

/// A 64×64 skin with painted base faces and an empty hat layer.
pub fn test_skin() -> RgbaImage {
    RgbaImage::from_fn(64, 64, |x, y| {
        if y < 16 && x < 32 {
            Rgba([(x * 8) as u8, (y * 16) as u8, 120, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// 256×128 sheet: a red cell at (0, 0) and a green cell at (128, 0).
pub fn test_sheet() -> ItemSheet {
    let image = RgbaImage::from_fn(256, 128, |x, _| {
        if x < 128 {
            Rgba([200, 30, 30, 255])
        } else {
            Rgba([30, 200, 30, 255])
        }
    });
    let rules = RuleTable::parse(
        ".icon-1_0 { background-position: -128px 0px; }\n.icon-403_0 { background-position: 0px 0px; }",
    );
    ItemSheet::new(image, rules)
}

pub fn test_table() -> ItemTable {
    let mut table = BTreeMap::new();
    table.insert(
        "STONE".to_string(),
        SkyblockAsset::Item(ItemAsset { item_id: 1, damage: 0, glowing: false }),
    );
    table.insert(
        "ENCHANTED_BOOK".to_string(),
        SkyblockAsset::Item(ItemAsset { item_id: 403, damage: 0, glowing: true }),
    );
    table.insert(
        "HYPERION_HEAD".to_string(),
        SkyblockAsset::Head(HeadAsset { texture: HEAD_TEXTURE.to_string(), glowing: false }),
    );
    table
}

pub struct Fixture {
    pub dir: TempDir,
    pub textures: Arc<MockTextures>,
    pub service: Arc<AssetService>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_textures(MockTextures::new())
    }

    pub fn with_textures(textures: MockTextures) -> Self {
        let dir = TempDir::new().expect("should create temp dir");
        let glint_dir = dir.path().join("glint");
        for i in 0..GLINT_FRAMES {
            let overlay = RgbaImage::from_pixel(16, 16, Rgba([60 + 40 * i as u8, 20, 160, 255]));
            save_png(&overlay, &glint_dir.join(format!("{:02}.png", i))).expect("should write glint frame");
        }

        let mut essences = BTreeMap::new();
        essences.insert("wither".to_string(), HEAD_TEXTURE.to_string());

        let textures = Arc::new(textures);
        let service = AssetService::new(
            test_sheet(),
            Glint::new(glint_dir),
            AssetCache::new(FileStore::new(dir.path().join("store"))),
            Arc::new(ItemMetadataTable::from_table(test_table())),
            EssenceTable::new(essences),
            Arc::clone(&textures) as Arc<dyn TextureSource>,
        );

        Self { dir, textures, service: Arc::new(service) }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn stored(&self, key: &str) -> PathBuf {
        self.store_dir().join(format!("{}.png", key))
    }
}
