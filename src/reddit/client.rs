//! Reddit OAuth client implementing `FeedReader`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::config::{FeedConfig, RedditConfig};
use crate::domain::Submission;
use crate::error::{RelayError, Result};
use crate::reddit::types::{Listing, TokenResponse};

/// Source of ranked submissions.
#[async_trait]
pub trait FeedReader: Send + Sync {
    /// Hot submissions for `feed_name`, in ranking order.
    async fn get_hot(&self, feed_name: &str) -> Result<Vec<Submission>>;
}

/// How the bot account authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedditGrant {
    RefreshToken(String),
    Password { username: String, password: String },
}

/// Script-app credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub grant: RedditGrant,
}

impl RedditCredentials {
    /// Resolve credentials from the variables named in `config`.
    ///
    /// A refresh token wins over username/password when both are present.
    pub fn resolve<F>(config: &RedditConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(&config.client_id_env)
            .ok_or_else(|| RelayError::Config(format!("{} not set", config.client_id_env)))?;
        let client_secret = lookup(&config.client_secret_env)
            .ok_or_else(|| RelayError::Config(format!("{} not set", config.client_secret_env)))?;

        let grant = if let Some(token) = lookup(&config.refresh_token_env) {
            info!("> Preparing Reddit account with refresh token.");
            RedditGrant::RefreshToken(token)
        } else if let (Some(username), Some(password)) = (lookup(&config.username_env), lookup(&config.password_env)) {
            info!("> Preparing Reddit account with username/password");
            RedditGrant::Password { username, password }
        } else {
            return Err(RelayError::Config(format!(
                "You must define {} or {} and {}",
                config.refresh_token_env, config.username_env, config.password_env
            )));
        };

        Ok(Self {
            client_id,
            client_secret,
            grant,
        })
    }

    fn grant_form(&self) -> Vec<(&'static str, &str)> {
        match &self.grant {
            RedditGrant::RefreshToken(token) => vec![("grant_type", "refresh_token"), ("refresh_token", token.as_str())],
            RedditGrant::Password { username, password } => vec![
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ],
        }
    }
}

/// Reddit API client
pub struct RedditClient {
    client: Client,
    credentials: RedditCredentials,
    auth_url: String,
    api_url: String,
    limit: u32,
}

impl RedditClient {
    pub fn new(config: &RedditConfig, feed: &FeedConfig, credentials: RedditCredentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&feed.user_agent)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            credentials,
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            limit: feed.limit,
        })
    }

    /// Exchange the configured grant for a bearer token.
    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/v1/access_token", self.auth_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&self.credentials.grant_form())
            .send()
            .await
            .map_err(|e| RelayError::Feed(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Feed(format!("Token request returned {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Feed(format!("Invalid token response: {}", e)))?;

        match (token.access_token, token.error) {
            (Some(access_token), None) => Ok(access_token),
            (_, Some(error)) => Err(RelayError::Feed(format!("Authentication failed: {}", error))),
            (None, None) => Err(RelayError::Feed("Token response missing access_token".to_string())),
        }
    }
}

#[async_trait]
impl FeedReader for RedditClient {
    async fn get_hot(&self, feed_name: &str) -> Result<Vec<Submission>> {
        let token = self.access_token().await?;

        let url = format!("{}/r/{}/hot", self.api_url, feed_name);
        debug!("Requesting {} (limit {})", url, self.limit);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("limit", self.limit.to_string()), ("raw_json", "1".to_string())])
            .send()
            .await
            .map_err(|e| RelayError::Feed(format!("Listing request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Feed(format!("Got response {} from {}", status, url)));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| RelayError::Feed(format!("Invalid listing from {}: {}", url, e)))?;
        let submissions = listing.into_submissions()?;

        info!("> Fetched {} hot posts from r/{}", submissions.len(), feed_name);
        Ok(submissions)
    }
}
