use super::models::{NewReview, Review, ReviewInsertion, ReviewWithItem};
use super::review_store::ReviewStore;
use crate::catalog_store::{Item, SqliteCatalogStore};
use crate::sqlite_persistence::{constraint_violation, ConstraintViolation};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

const REVIEW_COLUMNS: &str = "id, account_id, item_id, score, comment, created";

fn parse_review_row(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        account_id: row.get(1)?,
        item_id: row.get(2)?,
        score: row.get(3)?,
        comment: row.get(4)?,
        created: row.get(5)?,
    })
}

impl ReviewStore for SqliteCatalogStore {
    fn find_review(&self, account_id: i64, item_id: i64) -> Result<Option<Review>> {
        let conn = self.read_conn()?;
        let review = conn
            .query_row(
                &format!(
                    "SELECT {} FROM review WHERE account_id = ?1 AND item_id = ?2",
                    REVIEW_COLUMNS
                ),
                params![account_id, item_id],
                parse_review_row,
            )
            .optional()?;
        Ok(review)
    }

    fn insert_review(&self, review: &NewReview) -> Result<ReviewInsertion> {
        let conn = self.write_conn()?;
        let result = conn.query_row(
            &format!(
                "INSERT INTO review (account_id, item_id, score, comment) VALUES (?1, ?2, ?3, ?4) \
                 RETURNING {}",
                REVIEW_COLUMNS
            ),
            params![
                review.account_id,
                review.item_id,
                review.score,
                review.comment
            ],
            parse_review_row,
        );

        match result {
            Ok(inserted) => Ok(ReviewInsertion::Inserted(inserted)),
            Err(err) => match constraint_violation(&err) {
                Some(ConstraintViolation::Unique(_)) => {
                    debug!(
                        "Review by account {} for item {} already exists",
                        review.account_id, review.item_id
                    );
                    Ok(ReviewInsertion::Duplicate)
                }
                Some(ConstraintViolation::ForeignKey) => {
                    // The item was just resolved, so the dangling reference is the account.
                    let account_exists = conn
                        .query_row(
                            "SELECT 1 FROM account WHERE id = ?1",
                            params![review.account_id],
                            |_| Ok(()),
                        )
                        .optional()?
                        .is_some();
                    if account_exists {
                        Err(err).with_context(|| {
                            format!("Review references missing item {}", review.item_id)
                        })
                    } else {
                        Ok(ReviewInsertion::UnknownAccount)
                    }
                }
                _ => Err(err).context("Failed to insert review"),
            },
        }
    }

    fn list_reviews_by_item(&self, item_id: i64) -> Result<Vec<Review>> {
        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM review WHERE item_id = ?1 ORDER BY created DESC, id DESC",
            REVIEW_COLUMNS
        ))?;
        let reviews = stmt
            .query_map(params![item_id], parse_review_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }

    fn list_reviews_by_account(&self, account_id: i64) -> Result<Vec<ReviewWithItem>> {
        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.account_id, r.item_id, r.score, r.comment, r.created, \
                    i.id, i.external_id, i.title, i.year, i.image_url, i.created \
             FROM review r JOIN item i ON i.id = r.item_id \
             WHERE r.account_id = ?1 \
             ORDER BY r.created DESC, r.id DESC",
        )?;
        let reviews = stmt
            .query_map(params![account_id], |row| {
                Ok(ReviewWithItem {
                    review: parse_review_row(row)?,
                    item: Item {
                        id: row.get(6)?,
                        external_id: row.get(7)?,
                        title: row.get(8)?,
                        year: row.get(9)?,
                        image_url: row.get(10)?,
                        created: row.get(11)?,
                    },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }
}
