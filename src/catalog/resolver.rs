//! Cache-aside resolution of provider works into local items.

use crate::catalog_store::{CatalogStore, Item, ItemWithStats, NewItem};
use crate::error::{ServiceError, ServiceResult};
use crate::metadata::{MetadataError, MetadataSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ItemResolver {
    store: Arc<dyn CatalogStore>,
    source: Arc<dyn MetadataSource>,
}

fn validate_external_id(external_id: i64) -> ServiceResult<()> {
    if external_id <= 0 {
        return Err(ServiceError::invalid_input(format!(
            "Invalid external id {}",
            external_id
        )));
    }
    Ok(())
}

impl ItemResolver {
    pub fn new(store: Arc<dyn CatalogStore>, source: Arc<dyn MetadataSource>) -> Self {
        Self { store, source }
    }

    /// Returns the local item for `external_id`, fetching it from the metadata source and
    /// caching it on first use.
    ///
    /// Concurrent calls for the same unseen id may all reach the source, but the upsert makes
    /// them converge on a single row and the same local id.
    pub async fn resolve(&self, external_id: i64) -> ServiceResult<Item> {
        validate_external_id(external_id)?;

        if let Some(item) = self.store.get_item_by_external_id(external_id)? {
            debug!("Cache hit for external id {}", external_id);
            return Ok(item);
        }

        debug!(
            "Cache miss for external id {}, asking {}",
            external_id,
            self.source.name()
        );
        let work = match self.source.lookup(external_id).await {
            Ok(work) => work,
            Err(MetadataError::NotFound(_)) => {
                return Err(ServiceError::not_found(format!(
                    "Item {} not found",
                    external_id
                )))
            }
            Err(err) => {
                warn!(
                    "Lookup of {} on {} failed: {}",
                    external_id,
                    self.source.name(),
                    err
                );
                return Err(ServiceError::UpstreamUnavailable(err));
            }
        };

        let item = self.store.upsert_item(&NewItem::from_work(&work))?;
        info!("Cached item {} as id {}", item.external_id, item.id);
        Ok(item)
    }

    /// Resolves the item and reads its review aggregates.
    pub async fn resolve_detail(&self, external_id: i64) -> ServiceResult<ItemWithStats> {
        let item = self.resolve(external_id).await?;
        let stats = self.store.get_item_stats(item.id)?;
        Ok(ItemWithStats { item, stats })
    }

    /// Looks the item up in the local cache only.
    pub fn find_cached(&self, external_id: i64) -> ServiceResult<Option<Item>> {
        validate_external_id(external_id)?;
        Ok(self.store.get_item_by_external_id(external_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{ItemStats, SqliteCatalogStore};
    use crate::metadata::testing::FakeMetadataSource;
    use tempfile::TempDir;
    use tokio::sync::Barrier;

    fn create_tmp_store() -> (Arc<SqliteCatalogStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteCatalogStore::new(temp_dir.path().join("review.db"), 2).unwrap();
        (Arc::new(store), temp_dir)
    }

    #[tokio::test]
    async fn miss_fetches_and_caches_then_hits() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        source.add_work(42, "Cowboy Bebop", None);
        let resolver = ItemResolver::new(store.clone(), source.clone());

        let first = resolver.resolve(42).await.unwrap();
        assert_eq!(first.title, "Cowboy Bebop");
        assert_eq!(first.year, 0);
        assert_eq!(first.image_url, None);
        assert_eq!(source.lookup_count(), 1);

        let second = resolver.resolve(42).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(source.lookup_count(), 1);
    }

    #[tokio::test]
    async fn unknown_work_is_not_found() {
        let (store, _temp_dir) = create_tmp_store();
        let resolver = ItemResolver::new(store.clone(), Arc::new(FakeMetadataSource::new()));

        assert!(matches!(
            resolver.resolve(7).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(store.get_items_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn failing_source_is_upstream_unavailable() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        source.add_work(7, "Seven", Some(2000));
        source.set_unavailable(true);
        let resolver = ItemResolver::new(store, source);

        assert!(matches!(
            resolver.resolve(7).await,
            Err(ServiceError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn cached_item_is_served_while_source_is_down() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        source.add_work(7, "Seven", Some(2000));
        let resolver = ItemResolver::new(store, source.clone());
        resolver.resolve(7).await.unwrap();

        source.set_unavailable(true);
        assert_eq!(resolver.resolve(7).await.unwrap().year, 2000);
    }

    #[tokio::test]
    async fn non_positive_id_is_invalid_input() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        let resolver = ItemResolver::new(store, source.clone());

        for id in [0, -3] {
            assert!(matches!(
                resolver.resolve(id).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }
        assert_eq!(source.lookup_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_resolves_converge_on_one_row() {
        let (store, _temp_dir) = create_tmp_store();
        // Both lookups are in flight before either result is cached.
        let source = Arc::new(FakeMetadataSource::with_lookup_barrier(Arc::new(
            Barrier::new(2),
        )));
        source.add_work(42, "Bebop", Some(1998));
        let resolver = ItemResolver::new(store.clone(), source.clone());

        let (a, b) = tokio::join!(resolver.resolve(42), resolver.resolve(42));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(source.lookup_count(), 2);
        assert_eq!(a.id, b.id);
        assert_eq!(store.get_items_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn detail_has_zero_stats_for_new_item() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        source.add_work(3, "Three", Some(2021));
        let resolver = ItemResolver::new(store, source);

        let detail = resolver.resolve_detail(3).await.unwrap();
        assert_eq!(detail.item.external_id, 3);
        assert_eq!(detail.stats, ItemStats::default());
    }

    #[tokio::test]
    async fn find_cached_never_calls_source() {
        let (store, _temp_dir) = create_tmp_store();
        let source = Arc::new(FakeMetadataSource::new());
        source.add_work(3, "Three", None);
        let resolver = ItemResolver::new(store, source.clone());

        assert_eq!(resolver.find_cached(3).unwrap(), None);
        assert_eq!(source.lookup_count(), 0);

        let item = resolver.resolve(3).await.unwrap();
        assert_eq!(resolver.find_cached(3).unwrap(), Some(item));
    }
}
