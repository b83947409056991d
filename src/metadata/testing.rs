use super::{MetadataError, MetadataSource, SearchPage, Work};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// In-memory metadata source for tests.
#[derive(Default)]
pub struct FakeMetadataSource {
    works: Mutex<HashMap<i64, Work>>,
    lookups: AtomicUsize,
    searches: AtomicUsize,
    unavailable: AtomicBool,
    lookup_barrier: Option<Arc<Barrier>>,
}

impl FakeMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup waits on `barrier` before answering, so concurrent lookups
    /// are all in flight at the same time.
    pub fn with_lookup_barrier(barrier: Arc<Barrier>) -> Self {
        Self {
            lookup_barrier: Some(barrier),
            ..Self::default()
        }
    }

    pub fn add_work(&self, external_id: i64, title: &str, season_year: Option<i32>) {
        self.works.lock().unwrap().insert(
            external_id,
            Work {
                external_id,
                title: title.to_string(),
                season_year,
                image_url: None,
            },
        );
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for FakeMetadataSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SearchPage, MetadataError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MetadataError::Timeout);
        }
        let skip: usize = after.and_then(|c| c.parse().ok()).unwrap_or(0);
        let mut matching: Vec<Work> = self
            .works
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.title.contains(keyword))
            .cloned()
            .collect();
        matching.sort_by_key(|w| w.external_id);
        let end = (skip + limit as usize).min(matching.len());
        let next_cursor = (end < matching.len()).then(|| end.to_string());
        Ok(SearchPage {
            works: matching.get(skip..end).map(<[Work]>::to_vec).unwrap_or_default(),
            next_cursor,
        })
    }

    async fn lookup(&self, external_id: i64) -> Result<Work, MetadataError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MetadataError::Connection("connection refused".to_string()));
        }
        self.works
            .lock()
            .unwrap()
            .get(&external_id)
            .cloned()
            .ok_or(MetadataError::NotFound(external_id))
    }
}
