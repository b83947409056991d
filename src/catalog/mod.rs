//! Catalog services: cache-aside item resolution, ranked listing and provider search.

mod ranking;
mod resolver;
mod search;

pub use ranking::{
    normalize_page, CatalogPage, Pagination, RankedCatalogQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use resolver::ItemResolver;
pub use search::{CatalogSearch, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
