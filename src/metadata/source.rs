//! Metadata source trait definition.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One work as reported by the metadata provider.
///
/// The provider does not always know the season year or have an image, both stay
/// optional here. Mapping to the local cache representation happens in
/// [`crate::catalog_store::NewItem::from_work`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub external_id: i64,
    pub title: String,
    pub season_year: Option<i32>,
    pub image_url: Option<String>,
}

/// A page of keyword search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub works: Vec<Work>,
    /// Cursor to pass as `after` for the following page, `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Errors that can occur when talking to the metadata provider.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned errors: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Work {0} not found")]
    NotFound(i64),
}

/// Read-only access to an external catalog of works.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &str;

    /// Keyword search. `after` is the cursor returned by a previous page.
    async fn search(
        &self,
        keyword: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<SearchPage, MetadataError>;

    /// Fetch a single work by its provider id.
    async fn lookup(&self, external_id: i64) -> Result<Work, MetadataError>;
}
