use crate::catalog_store::Item;
use serde::Serialize;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub account_id: i64,
    pub item_id: i64,
    pub score: i64,
    pub comment: Option<String>,
    pub created: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewReview {
    pub account_id: i64,
    pub item_id: i64,
    pub score: i64,
    pub comment: Option<String>,
}

/// A review together with the item it is about.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewWithItem {
    #[serde(flatten)]
    pub review: Review,
    pub item: Item,
}

/// Outcome of inserting a review, decided by the database constraints at insert time.
#[derive(Clone, Debug, PartialEq)]
pub enum ReviewInsertion {
    Inserted(Review),
    /// The account already reviewed this item.
    Duplicate,
    UnknownAccount,
}
