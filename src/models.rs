//! Data models for Skyblock assets and the remote item records they are built from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item id that always renders with the enchantment glint.
pub const ALWAYS_GLOWING: &str = "ENCHANTED_BOOK";

/// Material marking an item whose icon is a player head.
pub const SKULL_MATERIAL: &str = "SKULL_ITEM";

/// A flat item icon cut from the item sprite sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemAsset {
    pub item_id: i64,
    #[serde(default)]
    pub damage: i64,
    #[serde(default)]
    pub glowing: bool,
}

/// An isometric head rendered from a skin texture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeadAsset {
    pub texture: String,
    #[serde(default)]
    pub glowing: bool,
}

/// A renderable asset - an item or a head.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SkyblockAsset {
    Item(ItemAsset),
    Head(HeadAsset),
}

impl SkyblockAsset {
    pub fn glowing(&self) -> bool {
        match self {
            SkyblockAsset::Item(item) => item.glowing,
            SkyblockAsset::Head(head) => head.glowing,
        }
    }

    /// The same asset with the glint forced on.
    pub fn with_glow(mut self) -> Self {
        match &mut self {
            SkyblockAsset::Item(item) => item.glowing = true,
            SkyblockAsset::Head(head) => head.glowing = true,
        }
        self
    }
}

/// One record of the remote item metadata endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HypixelItem {
    pub id: String,
    #[serde(default)]
    pub item_id: i64,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub damage: Option<i64>,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub glowing: Option<bool>,
}

impl HypixelItem {
    /// Canonical table key: the id upper-cased.
    pub fn key(&self) -> String {
        self.id.to_uppercase()
    }

    /// Convert the remote record into the asset it renders as.
    pub fn to_asset(&self) -> SkyblockAsset {
        let glowing = self.glowing.unwrap_or(false) || self.key() == ALWAYS_GLOWING;
        if self.material == SKULL_MATERIAL {
            SkyblockAsset::Head(HeadAsset {
                texture: self.texture.clone().unwrap_or_default(),
                glowing,
            })
        } else {
            SkyblockAsset::Item(ItemAsset {
                item_id: self.item_id,
                damage: self.damage.unwrap_or(0),
                glowing,
            })
        }
    }
}

/// Build the metadata table from remote records. Later records with the same
/// key replace earlier ones.
pub fn build_table<'a>(
    items: impl IntoIterator<Item = &'a HypixelItem>,
) -> BTreeMap<String, SkyblockAsset> {
    items.into_iter().map(|item| (item.key(), item.to_asset())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> HypixelItem {
        serde_json::from_str(json).expect("record should parse")
    }

    #[test]
    fn test_asset_tagged_serialization() {
        let item = SkyblockAsset::Item(ItemAsset { item_id: 1, damage: 2, glowing: false });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "item");
        assert_eq!(json["item_id"], 1);

        let head = SkyblockAsset::Head(HeadAsset { texture: "abc".into(), glowing: true });
        let json = serde_json::to_value(&head).unwrap();
        assert_eq!(json["type"], "head");
        assert_eq!(json["texture"], "abc");
    }

    #[test]
    fn test_asset_glowing_defaults_false() {
        let asset: SkyblockAsset = serde_json::from_str(r#"{"type":"item","item_id":276}"#).unwrap();
        assert_eq!(asset, SkyblockAsset::Item(ItemAsset { item_id: 276, damage: 0, glowing: false }));
        assert!(!asset.glowing());
    }

    #[test]
    fn test_asset_unknown_type_rejected() {
        let result: Result<SkyblockAsset, _> = serde_json::from_str(r#"{"type":"block","item_id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_glow() {
        let head = SkyblockAsset::Head(HeadAsset { texture: "abc".into(), glowing: false });
        assert!(head.with_glow().glowing());
    }

    #[test]
    fn test_skull_becomes_head() {
        let item = record(r#"{"id":"HYPERION_SKULL","item_id":397,"material":"SKULL_ITEM","damage":3,"texture":"cafe"}"#);
        assert_eq!(
            item.to_asset(),
            SkyblockAsset::Head(HeadAsset { texture: "cafe".into(), glowing: false })
        );
    }

    #[test]
    fn test_skull_without_texture() {
        let item = record(r#"{"id":"MYSTERY","item_id":397,"material":"SKULL_ITEM"}"#);
        assert_eq!(item.to_asset(), SkyblockAsset::Head(HeadAsset { texture: String::new(), glowing: false }));
    }

    #[test]
    fn test_item_damage_defaults_zero() {
        let item = record(r#"{"id":"ASPECT_OF_THE_END","item_id":276,"material":"DIAMOND_SWORD"}"#);
        assert_eq!(
            item.to_asset(),
            SkyblockAsset::Item(ItemAsset { item_id: 276, damage: 0, glowing: false })
        );
    }

    #[test]
    fn test_glowing_flag_kept() {
        let item = record(r#"{"id":"X","item_id":1,"material":"STONE","glowing":true}"#);
        assert!(item.to_asset().glowing());
    }

    #[test]
    fn test_enchanted_book_always_glows() {
        let item = record(r#"{"id":"ENCHANTED_BOOK","item_id":403,"material":"ENCHANTED_BOOK","glowing":false}"#);
        assert!(item.to_asset().glowing());
    }

    #[test]
    fn test_build_table_uppercases_keys() {
        let items = vec![
            record(r#"{"id":"aspect_of_the_end","item_id":276,"material":"DIAMOND_SWORD"}"#),
            record(r#"{"id":"ENCHANTED_BOOK","item_id":403,"material":"ENCHANTED_BOOK"}"#),
        ];
        let table = build_table(&items);

        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["ASPECT_OF_THE_END", "ENCHANTED_BOOK"]);
        assert!(table["ENCHANTED_BOOK"].glowing());
    }
}
