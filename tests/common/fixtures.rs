//! Metadata source fixture

use super::constants::*;
use anime_score_server::metadata::{MetadataError, MetadataSource, SearchPage, Work};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed set of works served from memory.
pub struct StaticMetadataSource {
    works: Vec<Work>,
    lookups: AtomicUsize,
}

impl StaticMetadataSource {
    pub fn new() -> Self {
        let work = |external_id: i64, title: &str, season_year: Option<i32>| Work {
            external_id,
            title: title.to_string(),
            season_year,
            image_url: Some(format!("https://img.example/{}.png", external_id)),
        };
        Self {
            works: vec![
                work(WORK_42_ID, WORK_42_TITLE, Some(2014)),
                work(WORK_43_ID, WORK_43_TITLE, Some(2015)),
                work(WORK_44_ID, WORK_44_TITLE, None),
            ],
            lookups: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SearchPage, MetadataError> {
        let skip: usize = match after {
            Some(cursor) => cursor
                .parse()
                .map_err(|_| MetadataError::Provider(format!("bad cursor {}", cursor)))?,
            None => 0,
        };
        let matching: Vec<&Work> = self
            .works
            .iter()
            .filter(|w| w.title.contains(keyword))
            .collect();
        let end = (skip + limit as usize).min(matching.len());
        Ok(SearchPage {
            works: matching
                .iter()
                .skip(skip)
                .take(end.saturating_sub(skip))
                .map(|w| (*w).clone())
                .collect(),
            next_cursor: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn lookup(&self, external_id: i64) -> Result<Work, MetadataError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.works
            .iter()
            .find(|w| w.external_id == external_id)
            .cloned()
            .ok_or(MetadataError::NotFound(external_id))
    }
}
