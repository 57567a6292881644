//! Domain types for hotrelay
//!
//! - Submission: one feed item as read from the subreddit listing
//! - RelayOutcome: how a relay attempt for the chosen submission ended

pub mod outcome;
pub mod submission;

pub use outcome::RelayOutcome;
pub use submission::{Submission, permalink};
