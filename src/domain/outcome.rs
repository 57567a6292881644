//! Relay outcome types.
//!
//! This module defines the result of one pass through the relay pipeline.

/// Outcome of relaying the chosen submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Media was published and the record marked processed
    Published {
        /// Submission identifier that was relayed
        submission_id: String,
        /// Public URL of the posted status
        status_url: String,
    },
    /// Media type is not on the allow-list; nothing was published or committed
    Skipped {
        /// Submission identifier that was left unprocessed
        submission_id: String,
        /// Declared content type of the media response
        content_type: String,
    },
}

impl RelayOutcome {
    /// Identifier of the submission this outcome refers to.
    pub fn submission_id(&self) -> &str {
        match self {
            RelayOutcome::Published { submission_id, .. } => submission_id,
            RelayOutcome::Skipped { submission_id, .. } => submission_id,
        }
    }

    /// Whether anything was published.
    pub fn is_published(&self) -> bool {
        matches!(self, RelayOutcome::Published { .. })
    }
}
