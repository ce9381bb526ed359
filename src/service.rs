//! Asset service - resolves ids to assets and renders them through the cache

use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tracing::instrument;

use crate::cache::AssetCache;
use crate::fetch::{FetchError, MetadataSource, TextureSource};
use crate::glint::{Glint, GlintError};
use crate::head::{compose_head, DEFAULT_HEAD_SCALE};
use crate::metadata::{EssenceTable, ItemMetadataTable, MetadataError};
use crate::models::SkyblockAsset;
use crate::output::{encode_png, OutputError};
use crate::spritesheet::ItemSheet;
use crate::store::StoreError;

/// Suffix of the cache key used when the glint is forced on by the caller.
pub const GLOW_SUFFIX: &str = "_glow";

/// Error serving an asset
#[derive(Debug, Error)]
pub enum AssetError {
    /// No item or essence with this id
    #[error("Unknown {kind} '{id}'")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Glint(#[from] GlintError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("Failed to encode image: {0}")]
    Encode(#[from] OutputError),
    /// A blocking render task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(#[from] JoinError),
}

impl AssetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound { .. })
    }
}

/// Everything needed to render and serve assets.
pub struct AssetService {
    sheet: Arc<ItemSheet>,
    glint: Glint,
    cache: AssetCache,
    metadata: Arc<ItemMetadataTable>,
    essences: EssenceTable,
    textures: Arc<dyn TextureSource>,
    head_scale: f64,
}

impl AssetService {
    pub fn new(
        sheet: ItemSheet,
        glint: Glint,
        cache: AssetCache,
        metadata: Arc<ItemMetadataTable>,
        essences: EssenceTable,
        textures: Arc<dyn TextureSource>,
    ) -> Self {
        Self {
            sheet: Arc::new(sheet),
            glint,
            cache,
            metadata,
            essences,
            textures,
            head_scale: DEFAULT_HEAD_SCALE,
        }
    }

    pub fn with_head_scale(mut self, scale: f64) -> Self {
        self.head_scale = scale;
        self
    }

    pub fn metadata(&self) -> &Arc<ItemMetadataTable> {
        &self.metadata
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Known item ids, sorted.
    pub fn item_ids(&self) -> Vec<String> {
        self.metadata.ids()
    }

    /// Known essence ids, sorted.
    pub fn essence_ids(&self) -> Vec<String> {
        self.essences.ids()
    }

    /// Stored bytes of an item, rendering them on first request.
    ///
    /// `force_glow` adds the glint to items that don't normally glow; those
    /// renders are stored under a separate key.
    pub async fn item(&self, id: &str, force_glow: bool) -> Result<Vec<u8>, AssetError> {
        let mut key = id.to_uppercase();
        let mut asset = self
            .metadata
            .get(&key)
            .ok_or_else(|| AssetError::NotFound { kind: "item", id: key.clone() })?;
        if force_glow && !asset.glowing() {
            asset = asset.with_glow();
            key.push_str(GLOW_SUFFIX);
        }

        self.cache.get_or_render(&key, || self.render_asset(&asset)).await
    }

    /// PNG of the head for a raw texture id. Heads are not stored.
    pub async fn head(&self, texture_id: &str) -> Result<Vec<u8>, AssetError> {
        let icon = self.render_head(texture_id).await?;
        Ok(spawn_blocking(move || encode_png(&icon)).await??)
    }

    /// PNG of the head of an essence.
    pub async fn essence(&self, id: &str) -> Result<Vec<u8>, AssetError> {
        let texture = self
            .essences
            .texture(id)
            .ok_or_else(|| AssetError::NotFound { kind: "essence", id: id.to_uppercase() })?
            .to_string();
        self.head(&texture).await
    }

    /// Render an asset to its final bytes: PNG, or GIF when glowing.
    #[instrument(skip(self))]
    pub async fn render_asset(&self, asset: &SkyblockAsset) -> Result<Vec<u8>, AssetError> {
        let icon = match asset {
            SkyblockAsset::Item(item) => {
                let sheet = Arc::clone(&self.sheet);
                let (item_id, damage) = (item.item_id, item.damage);
                spawn_blocking(move || sheet.render_item(item_id, damage)).await?
            }
            SkyblockAsset::Head(head) => self.render_head(&head.texture).await?,
        };

        if asset.glowing() {
            let glint = self.glint.clone();
            Ok(spawn_blocking(move || glint.apply(&icon)).await??)
        } else {
            Ok(spawn_blocking(move || encode_png(&icon)).await??)
        }
    }

    /// Fetch a skin and compose its head icon.
    #[instrument(skip(self))]
    pub async fn render_head(&self, texture_id: &str) -> Result<RgbaImage, AssetError> {
        let skin = self.textures.fetch_skin(texture_id).await?;
        let texture_id = texture_id.to_string();
        let scale = self.head_scale;
        Ok(spawn_blocking(move || compose_head(&skin, &texture_id, scale)).await?)
    }

    /// Refresh the item table from `source`.
    pub async fn refresh(&self, source: &dyn MetadataSource) -> Result<usize, AssetError> {
        Ok(self.metadata.refresh(source).await?)
    }

    /// Remove every stored render.
    pub async fn clear_store(&self) -> Result<usize, AssetError> {
        Ok(self.cache.store().clear().await?)
    }
}
