mod ledger;
mod models;
mod review_store;
mod sqlite_review_store;

pub use ledger::ReviewLedger;
pub use models::{NewReview, Review, ReviewInsertion, ReviewWithItem, MAX_SCORE, MIN_SCORE};
pub use review_store::ReviewStore;
