//! Configuration system for hotrelay.
//!
//! Three layers, later wins:
//! 1. YAML file (explicit path, ./hotrelay.yml, or ~/.config/hotrelay/hotrelay.yml)
//! 2. Environment overrides (SUBREDDIT, MIN_POST_KARMA, FILTER_ENABLED, FILTER_REGEXP)
//! 3. Command-line feed overrides (`run --feed`, `run --min-score`)
//!
//! Credentials never live in the file; each client section names the
//! environment variables they are read from.

use eyre::Result;
use std::path::PathBuf;

pub use self::global::{ConfigSource, FeedConfig, FilterConfig, RedditConfig, RelayConfig, StorageConfig, TwitterConfig};
pub use self::overrides::{FeedOverrides, env_lookup, load_dotenv, load_dotenv_from};

mod global;
mod overrides;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "hotrelay.yml";

/// Default user agent for Reddit and media requests.
pub const DEFAULT_USER_AGENT: &str = concat!("hotrelay/", env!("CARGO_PKG_VERSION"));

/// Load the file layer, then apply environment and command-line overrides.
///
/// Validation is left to the caller: `status` only needs storage settings.
pub fn load_config(explicit_path: Option<&PathBuf>, overrides: &FeedOverrides) -> Result<(RelayConfig, ConfigSource)> {
    load_config_with(explicit_path, overrides, env_lookup)
}

/// `load_config` with an arbitrary variable lookup.
pub fn load_config_with<F>(
    explicit_path: Option<&PathBuf>,
    overrides: &FeedOverrides,
    lookup: F,
) -> Result<(RelayConfig, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = RelayConfig::load(explicit_path)?;
    config.apply_overrides(lookup)?;
    overrides.apply(&mut config.feed);
    Ok((config, source))
}
