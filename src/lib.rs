//! hotrelay - relay one hot image post per run
//!
//! Reads the hot listing of a subreddit, picks the first eligible image post
//! that has not been relayed yet, downloads it, and republishes it with an
//! attribution caption to a Twitter account. A SQLite table of processed
//! submission ids keeps each post from being relayed twice.

pub mod bot;
pub mod caption;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod media;
pub mod reddit;
pub mod relay;
pub mod selector;
pub mod store;
pub mod twitter;

pub use bot::RelayBot;
pub use error::{RelayError, Result};
