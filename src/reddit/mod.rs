//! Feed reader: hot listings from Reddit.

mod client;
mod types;

pub use client::{FeedReader, RedditClient, RedditCredentials, RedditGrant};
pub use types::{Listing, TokenResponse};
