//! Ranked, paginated listing of cached items.
//!
//! Pages are ordered by mean score, then review count, then newest first. Count and page are
//! read from one snapshot, but nothing pins the snapshot between two page requests: a review
//! or item written mid-scan can shift rows across a page boundary.

use crate::catalog_store::{CatalogStore, ItemWithStats};
use crate::error::ServiceResult;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogPage {
    pub items: Vec<ItemWithStats>,
    pub pagination: Pagination,
}

/// `page` below 1 becomes 1. A missing or non-positive `page_size` becomes the default,
/// anything above the maximum is capped.
pub fn normalize_page(page: Option<i64>, page_size: Option<i64>) -> (usize, usize) {
    let page = page.filter(|p| *p >= 1).unwrap_or(1) as usize;
    let page_size = match page_size {
        Some(size) if size > 0 => (size as usize).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };
    (page, page_size)
}

pub struct RankedCatalogQuery {
    store: Arc<dyn CatalogStore>,
}

impl RankedCatalogQuery {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, page: Option<i64>, page_size: Option<i64>) -> ServiceResult<CatalogPage> {
        let (page, page_size) = normalize_page(page, page_size);

        // An offset SQLite cannot bind is past the end of any catalog.
        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok());
        let (items, total) = match offset {
            Some(offset) => self.store.list_items_with_stats(page_size, offset)?,
            None => (Vec::new(), self.store.get_items_count()?),
        };
        Ok(CatalogPage {
            items,
            pagination: Pagination {
                page,
                page_size,
                total,
                total_pages: total.div_ceil(page_size),
            },
        })
    }
}
