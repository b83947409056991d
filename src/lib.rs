//! Anime Score Server Library
//!
//! Catalog caching, review aggregation and account services behind the HTTP server.

pub mod catalog;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod metadata;
pub mod review;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use catalog::{CatalogSearch, ItemResolver, RankedCatalogQuery};
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use error::{ServiceError, ServiceResult};
pub use metadata::{AnnictClient, MetadataError, MetadataSource};
pub use review::ReviewLedger;
pub use server::{run_server, RequestsLoggingLevel};
pub use user::{AccountAuthenticator, CredentialHasher, TokenSigner};
