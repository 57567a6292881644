//! Storage layer for hotrelay.
//!
//! Persists one `ProcessedRecord` per submission id in SQLite so a
//! submission is relayed at most once across runs.
//!
//! # Example
//!
//! ```ignore
//! use hotrelay::store::{RecordStore, SqliteRecordStore};
//! use std::path::Path;
//!
//! let mut store = SqliteRecordStore::open(Path::new("db.sqlite"))?;
//! let (record, created) = store.find_or_create("abc123")?;
//! if !record.processed {
//!     store.mark_processed("abc123")?;
//! }
//! ```

mod record_store;
mod records;

pub use record_store::{RecordStore, SqliteRecordStore};
pub use records::{ProcessedRecord, now_ms};
