//! SQLite-backed store for the review database.
//!
//! `SqliteCatalogStore` owns every connection to the database file. Writes go through a single
//! connection; reads are spread round-robin over a small pool of read-only connections. The
//! review and account store traits are implemented on the same struct in their own modules.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

pub const DEFAULT_READ_POOL_SIZE: usize = 4;

const ITEM_COLUMNS: &str = "id, external_id, title, year, image_url, created";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Arc<Vec<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
}

fn lock_conn(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("Database connection mutex poisoned"))
}

impl SqliteCatalogStore {
    /// Open (creating if needed) the database at `db_path` and bring its schema up to date.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();
        if read_pool_size == 0 {
            bail!("Read pool size must be at least 1");
        }

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

        write_conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut write_conn, CATALOG_VERSIONED_SCHEMAS)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open read connection")?;
            read_pool.push(Mutex::new(read_conn));
        }

        let store = SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool: Arc::new(read_pool),
            read_index: Arc::new(AtomicUsize::new(0)),
        };
        info!(
            "Opened review database {:?} with {} items",
            db_path,
            store.get_items_count()?
        );
        Ok(store)
    }

    pub(crate) fn read_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.read_pool.len();
        lock_conn(&self.read_pool[index])
    }

    pub(crate) fn write_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        lock_conn(&self.write_conn)
    }

    pub(crate) fn parse_item_row(row: &Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            external_id: row.get(1)?,
            title: row.get(2)?,
            year: row.get(3)?,
            image_url: row.get(4)?,
            created: row.get(5)?,
        })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_item_by_external_id(&self, external_id: i64) -> Result<Option<Item>> {
        let conn = self.read_conn()?;
        let item = conn
            .query_row(
                &format!("SELECT {} FROM item WHERE external_id = ?1", ITEM_COLUMNS),
                params![external_id],
                Self::parse_item_row,
            )
            .optional()?;
        Ok(item)
    }

    fn upsert_item(&self, item: &NewItem) -> Result<Item> {
        let conn = self.write_conn()?;
        let stored = conn
            .query_row(
                &format!(
                    "INSERT INTO item (external_id, title, year, image_url) VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT (external_id) DO UPDATE SET title = excluded.title \
                     RETURNING {}",
                    ITEM_COLUMNS
                ),
                params![item.external_id, item.title, item.year, item.image_url],
                Self::parse_item_row,
            )
            .with_context(|| format!("Failed to upsert item {}", item.external_id))?;
        debug!(
            "Upserted item external_id={} as id={}",
            stored.external_id, stored.id
        );
        Ok(stored)
    }

    fn get_item_stats(&self, item_id: i64) -> Result<ItemStats> {
        let conn = self.read_conn()?;
        let stats = conn
            .query_row(
                "SELECT review_count, avg_score FROM item_stats WHERE item_id = ?1",
                params![item_id],
                |row| {
                    Ok(ItemStats {
                        review_count: row.get(0)?,
                        avg_score: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(stats.unwrap_or_default())
    }

    fn list_items_with_stats(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<ItemWithStats>, usize)> {
        let limit = i64::try_from(limit).context("Page size out of range")?;
        let offset = i64::try_from(offset).context("Page offset out of range")?;
        let mut conn = self.read_conn()?;
        // Count and page come from the same snapshot.
        let tx = conn.transaction()?;

        let total: i64 = tx.query_row("SELECT COUNT(*) FROM item", [], |r| r.get(0))?;

        let items = {
            let mut stmt = tx.prepare(
                "SELECT i.id, i.external_id, i.title, i.year, i.image_url, i.created, \
                        COALESCE(s.review_count, 0) AS review_count, \
                        COALESCE(s.avg_score, 0.0) AS avg_score \
                 FROM item i LEFT JOIN item_stats s ON s.item_id = i.id \
                 ORDER BY avg_score DESC, review_count DESC, i.created DESC, i.id DESC \
                 LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt.query_map(params![limit, offset], |row| {
                Ok(ItemWithStats {
                    item: Self::parse_item_row(row)?,
                    stats: ItemStats {
                        review_count: row.get(6)?,
                        avg_score: row.get(7)?,
                    },
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;

        Ok((items, total as usize))
    }

    fn get_items_count(&self) -> Result<usize> {
        let conn = self.read_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM item", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
