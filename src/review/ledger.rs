//! One review per account and item.

use super::models::{NewReview, Review, ReviewInsertion, ReviewWithItem, MAX_SCORE, MIN_SCORE};
use super::review_store::ReviewStore;
use crate::catalog::ItemResolver;
use crate::error::{ServiceError, ServiceResult};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ReviewLedger {
    store: Arc<dyn ReviewStore>,
    resolver: Arc<ItemResolver>,
}

impl ReviewLedger {
    pub fn new(store: Arc<dyn ReviewStore>, resolver: Arc<ItemResolver>) -> Self {
        Self { store, resolver }
    }

    /// Records `account_id`'s review of the work `external_id`, caching the work first if
    /// needed. A second review of the same work by the same account is a `Conflict`.
    pub async fn create_review(
        &self,
        account_id: i64,
        external_id: i64,
        score: i64,
        comment: Option<&str>,
    ) -> ServiceResult<Review> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(ServiceError::invalid_input(format!(
                "Score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }
        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let item = self.resolver.resolve(external_id).await?;

        // Early exit only, the unique index decides.
        if self.store.find_review(account_id, item.id)?.is_some() {
            return Err(ServiceError::conflict("Item already reviewed"));
        }

        let insertion = self.store.insert_review(&NewReview {
            account_id,
            item_id: item.id,
            score,
            comment,
        })?;
        match insertion {
            ReviewInsertion::Inserted(review) => {
                info!(
                    "Account {} reviewed item {} with score {}",
                    account_id, item.id, review.score
                );
                Ok(review)
            }
            ReviewInsertion::Duplicate => {
                debug!(
                    "Concurrent duplicate review by account {} for item {}",
                    account_id, item.id
                );
                Err(ServiceError::conflict("Item already reviewed"))
            }
            ReviewInsertion::UnknownAccount => Err(ServiceError::not_found(format!(
                "Account {} not found",
                account_id
            ))),
        }
    }

    /// Reviews of a work, newest first. A work that was never cached has no reviews.
    pub fn list_reviews_for_item(&self, external_id: i64) -> ServiceResult<Vec<Review>> {
        match self.resolver.find_cached(external_id)? {
            Some(item) => Ok(self.store.list_reviews_by_item(item.id)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn list_reviews_for_account(&self, account_id: i64) -> ServiceResult<Vec<ReviewWithItem>> {
        Ok(self.store.list_reviews_by_account(account_id)?)
    }
}
