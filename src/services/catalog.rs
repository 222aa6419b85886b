use serde::Deserialize;
use std::path::Path;

use crate::models::{ContentAttributes, MediaRef};

const UNSPLASH_BASE: &str = "https://images.unsplash.com";

/// One reusable asset in the underlying pool
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogAsset {
    /// Stable short key, used as the prefix of minted item ids
    pub key: String,
    pub media_ref: MediaRef,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub attributes: ContentAttributes,
}

/// Fixed, non-empty pool of assets the batch generators cycle over
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    assets: Vec<CatalogAsset>,
}

impl ContentCatalog {
    /// Creates a catalog from a list of assets. Fails when the list is empty.
    pub fn new(assets: Vec<CatalogAsset>) -> anyhow::Result<Self> {
        if assets.is_empty() {
            anyhow::bail!("content catalog must contain at least one asset");
        }
        Ok(Self { assets })
    }

    /// Loads a catalog from a JSON array of assets
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        let assets: Vec<CatalogAsset> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog {}: {}", path.display(), e))?;

        tracing::info!(path = %path.display(), assets = assets.len(), "Loaded content catalog");
        Self::new(assets)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Asset at `position`, wrapping around the pool
    pub fn asset_at(&self, position: u64) -> &CatalogAsset {
        let index = (position % self.assets.len() as u64) as usize;
        &self.assets[index]
    }

    pub fn assets(&self) -> &[CatalogAsset] {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut [CatalogAsset] {
        &mut self.assets
    }

    /// The built-in hand-tagged pool of moodboard imagery
    pub fn builtin() -> Self {
        let entries: [(&str, &str, &str, &[&str], &[&str], &[&str], &[&str]); 20] = [
            ("mountain", "photo-1531306728370-e2ebd9d7bb99", "Mountain landscape",
                &["landscape", "photography"], &["mountain", "nature"], &["calm", "vast"], &["blue", "white"]),
            ("modern-space", "photo-1638586536549-f0934ecde621", "Modern space",
                &["interior", "architecture"], &["modern", "space"], &["calm"], &["white", "grey"]),
            ("colorful-patterns", "photo-1551913902-c92207136625", "Colorful patterns",
                &["abstract", "pattern"], &["colorful", "shapes"], &["playful"], &["pink", "yellow"]),
            ("abstract-art", "photo-1604871000636-074fa5117945", "Abstract art",
                &["abstract", "art"], &["paint", "texture"], &["bold"], &["orange", "blue"]),
            ("design", "photo-1547891654-e66ed7ebb968", "Design study",
                &["design", "art"], &["composition", "shapes"], &["bold"], &["red", "black"]),
            ("pattern", "photo-1549490349-8643362247b5", "Repeating pattern",
                &["pattern", "abstract"], &["repetition", "texture"], &["calm"], &["beige", "white"]),
            ("architecture", "photo-1561484930-998b6a7b22e8", "Architectural element",
                &["architecture"], &["concrete", "geometry"], &["stark"], &["grey", "white"]),
            ("gradient", "photo-1579546929518-9e396f3cc809", "Gradient design",
                &["abstract", "gradient"], &["smooth", "digital"], &["dreamy"], &["purple", "pink", "blue"]),
            ("interior", "photo-1579887829694-315f48210ce9", "Modern interior",
                &["interior", "design"], &["furniture", "modern"], &["warm"], &["beige", "green"]),
            ("shape", "photo-1574790248020-231e191a92c6", "Abstract shape",
                &["abstract", "3d"], &["shapes", "render"], &["playful"], &["pink", "blue"]),
            ("minimal", "photo-1550684848-fac1c5b4e853", "Minimal concept",
                &["design", "minimal"], &["negative-space", "composition"], &["calm"], &["white", "black"]),
            ("layout", "photo-1567359781514-3b964e2b04d6", "Design layout",
                &["design", "typography"], &["grid", "layout"], &["focused"], &["white", "red"]),
            ("texture", "photo-1598449428635-4e435d3f5f32", "Material texture",
                &["texture", "photography"], &["material", "close-up"], &["raw"], &["brown", "grey"]),
            ("color-study", "photo-1604537466608-109fa2f16c3b", "Color study",
                &["art", "gradient"], &["color", "paint"], &["dreamy"], &["orange", "pink"]),
            ("geometric", "photo-1618005182384-a83a8bd57fbe", "Geometric form",
                &["abstract", "3d"], &["geometry", "render"], &["bold"], &["blue", "purple"]),
            ("light-pattern", "photo-1581349437898-cea573747ec7", "Light pattern",
                &["pattern", "photography"], &["light", "neon"], &["vibrant"], &["purple", "blue"]),
            ("furniture", "photo-1517999349371-35c2044ebc9e", "Minimal furniture",
                &["interior", "minimal"], &["furniture", "wood"], &["warm"], &["brown", "white"]),
            ("abstract-photo", "photo-1622547748225-3fc4abd2cca0", "Abstract photography",
                &["abstract", "photography"], &["blur", "light"], &["dreamy"], &["orange", "purple"]),
            ("gradient-abstract", "photo-1618172193763-c511deb635ca", "Gradient abstract",
                &["gradient", "3d"], &["smooth", "render"], &["vibrant"], &["blue", "green"]),
            ("organic-form", "photo-1618172193622-ae2d025f4032", "Organic form",
                &["3d", "art"], &["organic", "render"], &["calm"], &["green", "beige"]),
        ];

        let assets = entries
            .into_iter()
            .map(|(key, photo, caption, categories, tags, moods, colors)| CatalogAsset {
                key: key.to_string(),
                media_ref: MediaRef::new(format!("{UNSPLASH_BASE}/{photo}?q=80&w=1000")),
                caption: Some(caption.to_string()),
                attributes: ContentAttributes::from_parts(categories, tags, moods, colors),
            })
            .collect();

        Self { assets }
    }
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
