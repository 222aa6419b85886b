use std::collections::HashMap;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{ContentAttributes, MediaRef},
};

use super::catalog::ContentCatalog;

/// Source of attribute metadata for media assets
///
/// Implementations return `Ok(None)` when they know nothing about an asset.
/// Callers treat both `None` and errors as "no extra attributes".
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Attributes for the asset behind `media_ref`, if known
    async fn attributes_for(&self, media_ref: &MediaRef) -> AppResult<Option<ContentAttributes>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Metadata loaded from a JSON object keyed by media reference
#[derive(Debug, Clone, Default)]
pub struct FileMetadata {
    entries: HashMap<String, ContentAttributes>,
}

impl FileMetadata {
    pub fn new(entries: HashMap<String, ContentAttributes>) -> Self {
        Self { entries }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read metadata {}: {}", path.display(), e))?;
        let entries: HashMap<String, ContentAttributes> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse metadata {}: {}", path.display(), e))?;

        tracing::info!(path = %path.display(), entries = entries.len(), "Loaded metadata file");
        Ok(Self { entries })
    }
}

#[async_trait::async_trait]
impl MetadataSource for FileMetadata {
    async fn attributes_for(&self, media_ref: &MediaRef) -> AppResult<Option<ContentAttributes>> {
        if media_ref.as_str().is_empty() {
            return Err(AppError::Metadata("empty media reference".to_string()));
        }
        Ok(self.entries.get(media_ref.as_str()).cloned())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Merges metadata from `source` into every catalog asset
///
/// Failures are logged and leave the asset's attributes unchanged. Returns
/// the number of assets that received attributes.
pub async fn enrich_catalog(catalog: &mut ContentCatalog, source: &dyn MetadataSource) -> usize {
    let mut enriched = 0;
    let mut failed = 0;

    for asset in catalog.assets_mut() {
        match source.attributes_for(&asset.media_ref).await {
            Ok(Some(attributes)) => {
                asset.attributes.merge(&attributes);
                enriched += 1;
            }
            Ok(None) => {
                tracing::debug!(key = %asset.key, source = source.name(), "No metadata for asset");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    key = %asset.key,
                    source = source.name(),
                    error = %e,
                    "Metadata lookup failed"
                );
            }
        }
    }

    tracing::info!(
        source = source.name(),
        enriched,
        failed,
        total = catalog.len(),
        "Catalog enrichment finished"
    );

    enriched
}
