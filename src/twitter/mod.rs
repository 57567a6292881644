//! Publisher: the Twitter account media is relayed to.

mod client;
mod oauth;

pub use client::{PostedStatus, Publisher, TwitterClient};
pub use oauth::{OAuthCredentials, encode, signature_base, sign};
