//! Processed-record type for the record store.
//!
//! One row exists per submission id ever visited by the selector. The
//! `processed` flag flips false -> true once, after a successful relay.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A submission that has been visited by the selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedRecord {
    /// Submission identifier (unique)
    pub shortcode: String,

    /// Whether the submission has been relayed
    pub processed: bool,

    /// Unix timestamp in milliseconds
    pub created_at: i64,

    /// Unix timestamp in milliseconds
    pub updated_at: i64,
}

impl ProcessedRecord {
    /// Build a record from a `posts` row selected as
    /// `shortcode, processed, created_at, updated_at`.
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            shortcode: row.get(0)?,
            processed: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

/// Get current time in milliseconds since epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
