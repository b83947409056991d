//! CatalogStore trait definition.

use super::models::{Item, ItemStats, ItemWithStats, NewItem};
use anyhow::Result;

/// Durable local cache of items and their review aggregates.
pub trait CatalogStore: Send + Sync {
    /// Get an item by the provider's id.
    fn get_item_by_external_id(&self, external_id: i64) -> Result<Option<Item>>;

    /// Insert an item, or update the title of the item that already has the same external id.
    ///
    /// Returns the stored row either way, so concurrent callers converge on the same local id.
    fn upsert_item(&self, item: &NewItem) -> Result<Item>;

    /// Review aggregates for one item. Items without reviews get zero stats.
    fn get_item_stats(&self, item_id: i64) -> Result<ItemStats>;

    /// One ranked page of items with their stats, plus the total number of items.
    ///
    /// Ordered by mean score, then review count, then newest first.
    fn list_items_with_stats(&self, limit: usize, offset: usize)
        -> Result<(Vec<ItemWithStats>, usize)>;

    /// Get the number of cached items.
    fn get_items_count(&self) -> Result<usize>;
}
