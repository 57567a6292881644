//! File configuration (Layer 1).
//!
//! Loaded from an explicit path, ./hotrelay.yml, ~/.config/hotrelay/hotrelay.yml,
//! or built-in defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::caption::WordFilter;

/// Configuration for one relay run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Log level filter (overridden by RUST_LOG).
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr.
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Source subreddit and eligibility threshold.
    pub feed: FeedConfig,

    /// Title word masking.
    pub filter: FilterConfig,

    /// Reddit API endpoints and credential variables.
    pub reddit: RedditConfig,

    /// Twitter API endpoints and credential variables.
    pub twitter: TwitterConfig,

    /// Storage settings.
    pub storage: StorageConfig,
}

/// Where the file layer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl RelayConfig {
    /// Load the file layer.
    ///
    /// An explicit path must exist. Otherwise the first existing file among
    /// ./hotrelay.yml and ~/.config/hotrelay/hotrelay.yml is used, and
    /// defaults apply when neither exists. A file that exists but does not
    /// parse is an error.
    pub fn load(config_path: Option<&PathBuf>) -> Result<(Self, ConfigSource)> {
        match config_path {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                Ok((config, ConfigSource::File(path.clone())))
            }
            None => Self::load_first(&Self::search_paths()),
        }
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(crate::config::PROJECT_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hotrelay").join(crate::config::PROJECT_CONFIG_FILE));
        }
        paths
    }

    fn load_first(paths: &[PathBuf]) -> Result<(Self, ConfigSource)> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                Ok((config, ConfigSource::File(path.clone())))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.feed.name.trim().is_empty() {
            eyre::bail!("feed.name must be set (or SUBREDDIT in the environment)");
        }
        if self.feed.limit == 0 {
            eyre::bail!("feed.limit must be > 0");
        }
        if self.filter.enabled {
            if self.filter.pattern.is_empty() {
                eyre::bail!("filter.pattern must be set when filtering is enabled");
            }
            WordFilter::new(&self.filter.pattern)?;
        }
        Ok(())
    }

    /// Build the word filter described by the `filter` section.
    pub fn word_filter(&self) -> crate::error::Result<WordFilter> {
        WordFilter::from_settings(self.filter.enabled, &self.filter.pattern)
    }
}

/// Source feed settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Subreddit name without the `r/` prefix.
    pub name: String,

    /// Minimum score for a candidate (inclusive).
    #[serde(rename = "min-score")]
    pub min_score: i64,

    /// Number of hot submissions to request.
    pub limit: u32,

    /// User agent sent to Reddit and media hosts.
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for downloading a submission's media, in milliseconds.
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_score: 0,
            limit: 25,
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_ms: 30_000,
        }
    }
}

/// Title word filter.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    pub enabled: bool,

    /// Case-insensitive regular expression.
    pub pattern: String,
}

/// Reddit settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedditConfig {
    /// Base URL for the OAuth token endpoint.
    #[serde(rename = "auth-url")]
    pub auth_url: String,

    /// Base URL for authenticated API calls.
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Timeout per API request in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    #[serde(rename = "client-id-env")]
    pub client_id_env: String,

    #[serde(rename = "client-secret-env")]
    pub client_secret_env: String,

    #[serde(rename = "refresh-token-env")]
    pub refresh_token_env: String,

    #[serde(rename = "username-env")]
    pub username_env: String,

    #[serde(rename = "password-env")]
    pub password_env: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://www.reddit.com".to_string(),
            api_url: "https://oauth.reddit.com".to_string(),
            timeout_ms: 60_000,
            client_id_env: "REDDIT_CLIENT_ID".to_string(),
            client_secret_env: "REDDIT_CLIENT_SECRET".to_string(),
            refresh_token_env: "REDDIT_REFRESH_TOKEN".to_string(),
            username_env: "REDDIT_USERNAME".to_string(),
            password_env: "REDDIT_PASSWORD".to_string(),
        }
    }
}

/// Twitter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TwitterConfig {
    /// Base URL for media uploads.
    #[serde(rename = "upload-url")]
    pub upload_url: String,

    /// Base URL for status updates.
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Timeout per request in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Upload chunk size in bytes.
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    #[serde(rename = "consumer-key-env")]
    pub consumer_key_env: String,

    #[serde(rename = "consumer-secret-env")]
    pub consumer_secret_env: String,

    #[serde(rename = "access-token-env")]
    pub access_token_env: String,

    #[serde(rename = "access-token-secret-env")]
    pub access_token_secret_env: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://upload.twitter.com".to_string(),
            api_url: "https://api.twitter.com".to_string(),
            timeout_ms: 60_000,
            chunk_size: 5 * 1024 * 1024,
            consumer_key_env: "TWITTER_CONSUMER_KEY".to_string(),
            consumer_secret_env: "TWITTER_CONSUMER_SECRET".to_string(),
            access_token_env: "TWITTER_ACCESS_TOKEN_KEY".to_string(),
            access_token_secret_env: "TWITTER_ACCESS_TOKEN_SECRET".to_string(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding processed records.
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,

    /// Directory media is downloaded into.
    #[serde(rename = "tmp-dir")]
    pub tmp_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let default_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hotrelay");

        Self {
            db_path: default_dir.join("db.sqlite"),
            tmp_dir: PathBuf::from("./tmp"),
        }
    }
}
