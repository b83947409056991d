use axum::extract::FromRef;

use crate::catalog::{CatalogSearch, ItemResolver, RankedCatalogQuery};
use crate::catalog_store::SqliteCatalogStore;
use crate::metadata::MetadataSource;
use crate::review::ReviewLedger;
use crate::user::{AccountAuthenticator, CredentialHasher, TokenSigner};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedItemResolver = Arc<ItemResolver>;
pub type GuardedCatalogQuery = Arc<RankedCatalogQuery>;
pub type GuardedCatalogSearch = Arc<CatalogSearch>;
pub type GuardedReviewLedger = Arc<ReviewLedger>;
pub type GuardedAuthenticator = Arc<AccountAuthenticator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub resolver: GuardedItemResolver,
    pub catalog_query: GuardedCatalogQuery,
    pub catalog_search: GuardedCatalogSearch,
    pub review_ledger: GuardedReviewLedger,
    pub authenticator: GuardedAuthenticator,
}

impl ServerState {
    /// Wires every service on top of one store and one metadata source.
    pub fn new(
        config: ServerConfig,
        store: Arc<SqliteCatalogStore>,
        source: Arc<dyn MetadataSource>,
        hasher: CredentialHasher,
        signer: TokenSigner,
    ) -> Self {
        let resolver = Arc::new(ItemResolver::new(store.clone(), source.clone()));
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_query: Arc::new(RankedCatalogQuery::new(store.clone())),
            catalog_search: Arc::new(CatalogSearch::new(source)),
            review_ledger: Arc::new(ReviewLedger::new(store.clone(), resolver.clone())),
            authenticator: Arc::new(AccountAuthenticator::new(store, hasher, signer)),
            resolver,
        }
    }
}

impl FromRef<ServerState> for GuardedItemResolver {
    fn from_ref(input: &ServerState) -> Self {
        input.resolver.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogQuery {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_query.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogSearch {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_search.clone()
    }
}

impl FromRef<ServerState> for GuardedReviewLedger {
    fn from_ref(input: &ServerState) -> Self {
        input.review_ledger.clone()
    }
}

impl FromRef<ServerState> for GuardedAuthenticator {
    fn from_ref(input: &ServerState) -> Self {
        input.authenticator.clone()
    }
}
