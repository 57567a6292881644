//! Record store: the persisted at-most-once relay table.
//!
//! `RecordStore` is the contract the selector and relay pipeline use.
//! `SqliteRecordStore` implements it on a single SQLite table keyed by
//! submission id.

use crate::error::Result;
use crate::store::records::{ProcessedRecord, now_ms};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

/// Persistence contract for processed records.
pub trait RecordStore {
    /// Return the record for `id`, creating an unprocessed one if absent.
    ///
    /// The boolean is `true` when the record was created by this call.
    fn find_or_create(&mut self, id: &str) -> Result<(ProcessedRecord, bool)>;

    /// Set `processed = true` for `id`. A missing record is not an error.
    fn mark_processed(&mut self, id: &str) -> Result<()>;
}

/// Column list shared by every SELECT on `posts`.
const RECORD_COLUMNS: &str = "shortcode, processed, created_at, updated_at";

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    db: Connection,
}

impl SqliteRecordStore {
    /// Open or create the store at `db_path`, creating parent directories.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(db_path)?;
        Self::init_schema(&db)?;
        log::debug!("Opened record store at {}", db_path.display());

        Ok(Self { db })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        Self::init_schema(&db)?;
        Ok(Self { db })
    }

    /// Initialize the SQLite schema.
    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                shortcode TEXT NOT NULL UNIQUE,
                processed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_processed ON posts(processed);
            "#,
        )?;

        Ok(())
    }

    /// Get a record by submission id.
    pub fn get(&self, id: &str) -> Result<Option<ProcessedRecord>> {
        let sql = format!("SELECT {} FROM posts WHERE shortcode = ?1", RECORD_COLUMNS);
        let record = self
            .db
            .query_row(&sql, [id], ProcessedRecord::from_row)
            .optional()?;
        Ok(record)
    }

    /// List all records, most recently updated first.
    pub fn list_all(&self) -> Result<Vec<ProcessedRecord>> {
        let sql = format!(
            "SELECT {} FROM posts ORDER BY updated_at DESC, rowid DESC",
            RECORD_COLUMNS
        );
        let mut stmt = self.db.prepare(&sql)?;
        let rows = stmt.query_map([], ProcessedRecord::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Count records with the given processed flag.
    pub fn count_by_processed(&self, processed: bool) -> Result<usize> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM posts WHERE processed = ?1",
            [processed],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteRecordStore {
    fn find_or_create(&mut self, id: &str) -> Result<(ProcessedRecord, bool)> {
        let tx = self.db.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO posts (shortcode, processed, created_at, updated_at) VALUES (?1, 0, ?2, ?2)",
            params![id, now_ms()],
        )?;

        let sql = format!("SELECT {} FROM posts WHERE shortcode = ?1", RECORD_COLUMNS);
        let record = tx.query_row(&sql, [id], ProcessedRecord::from_row)?;
        tx.commit()?;

        Ok((record, inserted == 1))
    }

    fn mark_processed(&mut self, id: &str) -> Result<()> {
        let updated = self.db.execute(
            "UPDATE posts SET processed = 1, updated_at = ?2 WHERE shortcode = ?1 AND processed = 0",
            params![id, now_ms()],
        )?;

        if updated == 0 {
            match self.get(id)? {
                Some(_) => log::debug!("Record {} was already processed", id),
                None => log::warn!("No record for {} to mark processed", id),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/dir/db.sqlite");
        let _store = SqliteRecordStore::open(&db_path).unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn test_find_or_create_creates_unprocessed() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();

        let before = now_ms();
        let (record, created) = store.find_or_create("abc123").unwrap();
        assert!(created);
        assert_eq!(record.shortcode, "abc123");
        assert!(!record.processed);
        assert!(record.created_at >= before);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_find_or_create_is_idempotent() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();

        let (first, created_first) = store.find_or_create("abc123").unwrap();
        let (second, created_second) = store.find_or_create("abc123").unwrap();

        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first, second);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_mark_processed() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.find_or_create("abc123").unwrap();

        store.mark_processed("abc123").unwrap();

        let (record, created) = store.find_or_create("abc123").unwrap();
        assert!(!created);
        assert!(record.processed);
    }

    #[test]
    fn test_mark_processed_missing_record_is_silent() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.mark_processed("nope").unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_mark_processed_twice_keeps_flag() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.find_or_create("abc123").unwrap();

        store.mark_processed("abc123").unwrap();
        store.mark_processed("abc123").unwrap();

        assert!(store.get("abc123").unwrap().unwrap().processed);
    }

    #[test]
    fn test_counts() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.find_or_create("a").unwrap();
        store.find_or_create("b").unwrap();
        store.find_or_create("c").unwrap();
        store.mark_processed("b").unwrap();

        assert_eq!(store.count_by_processed(true).unwrap(), 1);
        assert_eq!(store.count_by_processed(false).unwrap(), 2);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("db.sqlite");

        {
            let mut store = SqliteRecordStore::open(&db_path).unwrap();
            store.find_or_create("abc123").unwrap();
            store.mark_processed("abc123").unwrap();
        }

        {
            let mut store = SqliteRecordStore::open(&db_path).unwrap();
            let (record, created) = store.find_or_create("abc123").unwrap();
            assert!(!created);
            assert!(record.processed);
        }
    }
}
