//! Submission type read from a subreddit listing.

use serde::{Deserialize, Serialize};

/// Short-link host used for permalinks built from a submission id.
const PERMALINK_BASE: &str = "https://redd.it";

/// One feed item with its metadata and optional media URL.
///
/// Field names follow the Reddit listing JSON so a `data` object
/// deserializes directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    /// Short base-36 identifier, unique per feed item
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Author's username (without the `u/` prefix)
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub score: i64,

    /// External media or link URL; absent for some text posts
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub stickied: bool,

    #[serde(default)]
    pub is_self: bool,

    #[serde(default)]
    pub is_video: bool,
}

impl Submission {
    /// Create a plain link submission with no flags set.
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>, score: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            score,
            url: None,
            stickied: false,
            is_self: false,
            is_video: false,
        }
    }

    /// Set the media URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The media URL, treating an empty string as absent.
    pub fn media_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Short permalink for this submission.
    pub fn permalink(&self) -> String {
        permalink(&self.id)
    }
}

/// Build the short permalink for a submission id.
pub fn permalink(id: &str) -> String {
    format!("{}/{}", PERMALINK_BASE, id)
}
