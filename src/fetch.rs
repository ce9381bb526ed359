//! Remote sources: skin textures and the item metadata endpoint
//!
//! Both are traits so the service can be driven by in-memory sources in tests.
//! [`HttpFetcher`] implements both over one shared `reqwest` client.

use async_trait::async_trait;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::HypixelItem;

/// Default item metadata endpoint.
pub const DEFAULT_ITEMS_URL: &str = "https://api.slothpixel.me/api/skyblock/items";
/// Default skin texture endpoint; the texture id is appended.
pub const DEFAULT_TEXTURE_URL: &str = "https://textures.minecraft.net/texture/";
/// Default timeout for any remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error fetching a remote resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed or timed out
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
    /// The body was not a decodable image
    #[error("Failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    /// The body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where skin textures come from.
#[async_trait]
pub trait TextureSource: Send + Sync {
    /// Fetch and decode the skin texture for `texture_id`.
    async fn fetch_skin(&self, texture_id: &str) -> Result<RgbaImage, FetchError>;
}

/// Where item metadata comes from.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch every item record.
    async fn fetch_items(&self) -> Result<Vec<HypixelItem>, FetchError>;
}

/// HTTP implementation of both sources.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    items_url: String,
    texture_url: String,
}

impl HttpFetcher {
    pub fn new(
        items_url: impl Into<String>,
        texture_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skyblock-assets/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, items_url: items_url.into(), texture_url: texture_url.into() })
    }

    /// Full URL of a skin texture.
    pub fn texture_url(&self, texture_id: &str) -> String {
        format!("{}{}", self.texture_url, texture_id)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl TextureSource for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_skin(&self, texture_id: &str) -> Result<RgbaImage, FetchError> {
        let bytes = self.get_bytes(&self.texture_url(texture_id)).await?;
        debug!(bytes = bytes.len(), "Fetched skin texture");
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[async_trait]
impl MetadataSource for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_items(&self) -> Result<Vec<HypixelItem>, FetchError> {
        let bytes = self.get_bytes(&self.items_url).await?;
        parse_items(&bytes)
    }
}

/// Parse the items endpoint body: an object keyed by item id, or a plain array.
pub fn parse_items(body: &[u8]) -> Result<Vec<HypixelItem>, FetchError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ItemsBody {
        Keyed(BTreeMap<String, HypixelItem>),
        List(Vec<HypixelItem>),
    }

    Ok(match serde_json::from_slice(body)? {
        ItemsBody::Keyed(map) => map.into_values().collect(),
        ItemsBody::List(list) => list,
    })
}
