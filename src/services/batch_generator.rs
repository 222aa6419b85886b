use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{ContentItem, ItemId};

use super::catalog::ContentCatalog;

/// Produces batches of never-before-issued items by cycling over a catalog
///
/// Each minted id combines the namespace, the asset key and a serial number.
/// The serial only ever grows, and any collision with `issued` (or with an
/// earlier item in the same batch) bumps it again before the item is emitted.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    catalog: Arc<ContentCatalog>,
    namespace: String,
    cursor: u64,
    next_serial: u64,
}

impl BatchGenerator {
    pub fn new(catalog: Arc<ContentCatalog>, namespace: impl Into<String>) -> Self {
        Self {
            catalog,
            namespace: namespace.into(),
            cursor: 0,
            next_serial: 0,
        }
    }

    /// Returns exactly `size` items whose ids are absent from `issued` and
    /// distinct from each other
    pub fn next_batch(&mut self, size: usize, issued: &HashSet<ItemId>) -> Vec<ContentItem> {
        let mut batch = Vec::with_capacity(size);
        let mut minted: HashSet<ItemId> = HashSet::with_capacity(size);

        for _ in 0..size {
            let asset = self.catalog.asset_at(self.cursor).clone();
            self.cursor = self.cursor.wrapping_add(1);

            let id = self.mint_unique(&asset.key, issued, &minted);
            minted.insert(id.clone());

            let mut item = ContentItem::new(id, asset.media_ref, asset.attributes);
            item.caption = asset.caption;
            batch.push(item);
        }

        tracing::debug!(
            namespace = %self.namespace,
            size,
            cursor = self.cursor,
            "Generated batch"
        );

        batch
    }

    fn mint_unique(
        &mut self,
        key: &str,
        issued: &HashSet<ItemId>,
        minted: &HashSet<ItemId>,
    ) -> ItemId {
        loop {
            let id = ItemId(format!("{}-{}-{}", self.namespace, key, self.next_serial));
            self.next_serial += 1;

            if !issued.contains(&id) && !minted.contains(&id) {
                return id;
            }

            tracing::debug!(id = %id, "Minted id already issued, retrying");
        }
    }
}
