//! Environment and command-line overrides (Layers 2 and 3).
//!
//! Applied on top of the file configuration so a plain `.env` deployment
//! works without a YAML file.

use eyre::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{FeedConfig, RelayConfig};

/// Subreddit to read.
pub const ENV_SUBREDDIT: &str = "SUBREDDIT";
/// Minimum score threshold.
pub const ENV_MIN_SCORE: &str = "MIN_POST_KARMA";
/// Enable the title word filter.
pub const ENV_FILTER_ENABLED: &str = "FILTER_ENABLED";
/// Word filter pattern.
pub const ENV_FILTER_PATTERN: &str = "FILTER_REGEXP";
/// User agent for Reddit.
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

/// Read a non-empty environment variable.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load `.env` from the working directory or one of its parents.
///
/// Returns the file that was loaded. A missing file is not an error; one
/// that exists but cannot be read or parsed is.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    tolerate_missing(dotenvy::dotenv())
}

/// Load a specific `.env` file with the same missing-file rule.
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    tolerate_missing(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn tolerate_missing(result: std::result::Result<PathBuf, dotenvy::Error>) -> Result<Option<PathBuf>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

/// Feed settings given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedOverrides {
    pub name: Option<String>,
    pub min_score: Option<i64>,
}

impl FeedOverrides {
    pub fn apply(&self, feed: &mut FeedConfig) {
        if let Some(name) = &self.name {
            feed.name = name.clone();
        }
        if let Some(min_score) = self.min_score {
            feed.min_score = min_score;
        }
    }
}

impl RelayConfig {
    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_SUBREDDIT) {
            self.feed.name = name.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_MIN_SCORE) {
            self.feed.min_score = raw
                .trim()
                .parse()
                .map_err(|_| eyre::eyre!("{} must be an integer, got '{}'", ENV_MIN_SCORE, raw))?;
        }

        if let Some(raw) = lookup(ENV_FILTER_ENABLED) {
            self.filter.enabled = parse_flag(&raw)
                .ok_or_else(|| eyre::eyre!("{} must be a boolean, got '{}'", ENV_FILTER_ENABLED, raw))?;
        }

        if let Some(pattern) = lookup(ENV_FILTER_PATTERN) {
            self.filter.pattern = pattern;
        }

        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            self.feed.user_agent = user_agent;
        }

        Ok(())
    }
}

/// Parse a boolean-ish environment value.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
