use super::models::{NewReview, Review, ReviewInsertion, ReviewWithItem};
use anyhow::Result;

pub trait ReviewStore: Send + Sync {
    /// Returns the review `account_id` wrote for `item_id`, if any.
    fn find_review(&self, account_id: i64, item_id: i64) -> Result<Option<Review>>;

    /// Inserts a review. A second review for the same (account, item) pair is reported as
    /// `ReviewInsertion::Duplicate` even when it races with the first one.
    fn insert_review(&self, review: &NewReview) -> Result<ReviewInsertion>;

    /// Reviews of one item, newest first.
    fn list_reviews_by_item(&self, item_id: i64) -> Result<Vec<Review>>;

    /// Reviews written by one account joined with their items, newest first.
    fn list_reviews_by_account(&self, account_id: i64) -> Result<Vec<ReviewWithItem>>;
}
