use crate::error::{ServiceError, ServiceResult};
use crate::metadata::{MetadataSource, SearchPage};
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Keyword search straight against the metadata source. Results are not cached.
pub struct CatalogSearch {
    source: Arc<dyn MetadataSource>,
}

impl CatalogSearch {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    pub async fn search(
        &self,
        keyword: &str,
        limit: Option<i64>,
        cursor: Option<&str>,
    ) -> ServiceResult<SearchPage> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::invalid_input("Search keyword is required"));
        }
        let limit = match limit {
            Some(l) if l > 0 => (l.min(MAX_SEARCH_LIMIT as i64)) as u32,
            _ => DEFAULT_SEARCH_LIMIT,
        };
        let cursor = cursor.map(str::trim).filter(|c| !c.is_empty());

        self.source
            .search(keyword, limit, cursor)
            .await
            .map_err(|err| {
                warn!("Search on {} failed: {}", self.source.name(), err);
                ServiceError::UpstreamUnavailable(err)
            })
    }
}
