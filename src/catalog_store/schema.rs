//! SQLite schema for the review database.
//!
//! Items are a local cache of provider works keyed by their external id. Reviews reference
//! accounts and items by rowid, and per-item aggregates are read through the `item_stats` view.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, View,
    DEFAULT_TIMESTAMP,
};

const ACCOUNT_TABLE: Table = Table {
    name: "account",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["username"], &["email"]],
};

const ITEM_TABLE: Table = Table {
    name: "item",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("external_id", &SqlType::Integer, non_null = true, is_unique = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        // 0 when the provider does not know the season year
        sqlite_column!(
            "year",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["external_id"]],
};

const REVIEW_TABLE: Table = Table {
    name: "review",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "item_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "item",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!("score", &SqlType::Integer, non_null = true),
        sqlite_column!("comment", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_review_item_id", "item_id"),
        ("idx_review_account_id", "account_id"),
    ],
    unique_constraints: &[&["account_id", "item_id"]],
};

const ITEM_STATS_VIEW: View = View {
    name: "item_stats",
    select: "SELECT item_id, COUNT(*) AS review_count, AVG(score) AS avg_score \
             FROM review GROUP BY item_id",
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ACCOUNT_TABLE, ITEM_TABLE, REVIEW_TABLE],
    views: &[ITEM_STATS_VIEW],
    migration: None,
}];
