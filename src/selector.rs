//! Selector: pick the first eligible candidate that has not been relayed.
//!
//! Every visited candidate gets a record before its flag is checked, and
//! the walk stops at the first unprocessed one. Candidates after the chosen
//! one are never visited or recorded.

use log::{debug, info};

use crate::domain::Submission;
use crate::error::{RelayError, Result};
use crate::store::RecordStore;

/// Walk `candidates` in order and return the first unprocessed one.
pub fn select_candidate<'a>(candidates: &'a [Submission], store: &mut dyn RecordStore) -> Result<&'a Submission> {
    info!("> Beginning search for suitable post...");

    for candidate in candidates {
        let (record, created) = store.find_or_create(&candidate.id)?;

        if !record.processed {
            info!("> Chose \"{}\" ({})", candidate.title, candidate.permalink());
            return Ok(candidate);
        }

        debug!(
            "{} already processed{}",
            candidate.id,
            if created { " (new record)" } else { "" }
        );
    }

    Err(RelayError::NoUnprocessedCandidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRecordStore;

    fn candidates(ids: &[&str]) -> Vec<Submission> {
        ids.iter()
            .map(|id| Submission::new(*id, format!("title {}", id), "author", 100).with_url("http://x/y.png"))
            .collect()
    }

    #[test]
    fn test_chooses_first_when_store_empty() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        let feed = candidates(&["b"]);

        let chosen = select_candidate(&feed, &mut store).unwrap();
        assert_eq!(chosen.id, "b");
        assert!(!store.get("b").unwrap().unwrap().processed);
    }

    #[test]
    fn test_skips_processed_and_stops_at_first_unprocessed() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        for id in ["a", "b"] {
            store.find_or_create(id).unwrap();
            store.mark_processed(id).unwrap();
        }
        let feed = candidates(&["a", "b", "c", "d", "e"]);

        let chosen = select_candidate(&feed, &mut store).unwrap();
        assert_eq!(chosen.id, "c");

        assert!(store.get("a").unwrap().unwrap().processed);
        assert!(store.get("b").unwrap().unwrap().processed);
        assert!(!store.get("c").unwrap().unwrap().processed);
        assert!(store.get("d").unwrap().is_none());
        assert!(store.get("e").unwrap().is_none());
    }

    #[test]
    fn test_all_processed_is_error_and_records_unchanged() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        for id in ["a", "b", "c"] {
            store.find_or_create(id).unwrap();
            store.mark_processed(id).unwrap();
        }
        let before = store.list_all().unwrap();
        let feed = candidates(&["a", "b", "c"]);

        let result = select_candidate(&feed, &mut store);
        assert!(matches!(result, Err(RelayError::NoUnprocessedCandidate)));

        let after = store.list_all().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_repeated_exhausted_walk_fails_the_same_way() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.find_or_create("a").unwrap();
        store.mark_processed("a").unwrap();
        let feed = candidates(&["a"]);

        assert!(matches!(
            select_candidate(&feed, &mut store),
            Err(RelayError::NoUnprocessedCandidate)
        ));
        assert!(matches!(
            select_candidate(&feed, &mut store),
            Err(RelayError::NoUnprocessedCandidate)
        ));
    }

    #[test]
    fn test_unprocessed_existing_record_is_chosen_again() {
        let mut store = SqliteRecordStore::open_in_memory().unwrap();
        store.find_or_create("a").unwrap();
        let feed = candidates(&["a", "b"]);

        let chosen = select_candidate(&feed, &mut store).unwrap();
        assert_eq!(chosen.id, "a");
        assert!(store.get("b").unwrap().is_none());
    }
}
