//! Read-only access to the external anime metadata provider.

mod annict;
mod source;
#[cfg(test)]
pub mod testing;

pub use annict::{AnnictClient, DEFAULT_ANNICT_ENDPOINT, DEFAULT_METADATA_TIMEOUT};
pub use source::{MetadataError, MetadataSource, SearchPage, Work};
