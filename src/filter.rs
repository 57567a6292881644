//! Candidate filter: static eligibility rules over a hot listing.
//!
//! Rank order is preserved. Checks run in a fixed order so the logged
//! rejection reason is stable, but every rule is an independent condition.

use log::{debug, info};

use crate::domain::Submission;
use crate::error::{RelayError, Result};

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Stickied,
    SelfPost,
    MissingUrl,
    Video,
    LowScore { score: i64, min_score: i64 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Stickied => write!(f, "stickied"),
            Rejection::SelfPost => write!(f, "text-only post"),
            Rejection::MissingUrl => write!(f, "no url"),
            Rejection::Video => write!(f, "video"),
            Rejection::LowScore { score, min_score } => write!(f, "score {} < {}", score, min_score),
        }
    }
}

/// Check one submission against the eligibility rules.
///
/// A score equal to `min_score` is accepted.
pub fn check_eligibility(submission: &Submission, min_score: i64) -> std::result::Result<(), Rejection> {
    if submission.stickied {
        return Err(Rejection::Stickied);
    }
    if submission.is_self {
        return Err(Rejection::SelfPost);
    }
    if submission.media_url().is_none() {
        return Err(Rejection::MissingUrl);
    }
    if submission.is_video {
        return Err(Rejection::Video);
    }
    if submission.score < min_score {
        return Err(Rejection::LowScore {
            score: submission.score,
            min_score,
        });
    }
    Ok(())
}

/// Keep the eligible submissions, in feed order.
///
/// Fails with `NoCandidates` when nothing survives.
pub fn filter_candidates(submissions: Vec<Submission>, min_score: i64) -> Result<Vec<Submission>> {
    let total = submissions.len();

    let candidates: Vec<Submission> = submissions
        .into_iter()
        .filter(|submission| match check_eligibility(submission, min_score) {
            Ok(()) => true,
            Err(reason @ (Rejection::Video | Rejection::LowScore { .. })) => {
                info!(" > Skipping post {} ({})", submission.id, reason);
                false
            }
            Err(reason) => {
                debug!(" > Skipping post {} ({})", submission.id, reason);
                false
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(RelayError::NoCandidates);
    }

    debug!("{} of {} posts are candidates", candidates.len(), total);
    Ok(candidates)
}
