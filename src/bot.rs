//! One relay run: read the feed, filter, select, relay.

use std::time::Duration;

use log::info;

use crate::config::{RelayConfig, env_lookup};
use crate::domain::RelayOutcome;
use crate::error::Result;
use crate::filter::filter_candidates;
use crate::media::HttpMediaFetcher;
use crate::reddit::{FeedReader, RedditClient, RedditCredentials};
use crate::relay::RelayPipeline;
use crate::selector::select_candidate;
use crate::store::RecordStore;
use crate::twitter::{OAuthCredentials, TwitterClient};

/// Wires the feed reader and relay pipeline for a single feed.
pub struct RelayBot {
    feed: Box<dyn FeedReader>,
    pipeline: RelayPipeline,
    feed_name: String,
    min_score: i64,
}

impl RelayBot {
    pub fn new(feed: Box<dyn FeedReader>, pipeline: RelayPipeline, feed_name: impl Into<String>, min_score: i64) -> Self {
        Self {
            feed,
            pipeline,
            feed_name: feed_name.into(),
            min_score,
        }
    }

    /// Build the production clients, reading credentials from the environment.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let reddit_credentials = RedditCredentials::resolve(&config.reddit, env_lookup)?;
        let feed = RedditClient::new(&config.reddit, &config.feed, reddit_credentials)?;

        let twitter_credentials = OAuthCredentials::resolve(&config.twitter, env_lookup)?;
        let publisher = TwitterClient::new(&config.twitter, twitter_credentials)?;

        let fetcher = HttpMediaFetcher::new(&config.feed.user_agent, Duration::from_millis(config.feed.fetch_timeout_ms))?;

        let pipeline = RelayPipeline::new(
            Box::new(fetcher),
            Box::new(publisher),
            config.feed.name.clone(),
            config.storage.tmp_dir.clone(),
            config.word_filter()?,
        );

        Ok(Self::new(Box::new(feed), pipeline, config.feed.name.clone(), config.feed.min_score))
    }

    /// Relay at most one submission.
    pub async fn run_once(&self, store: &mut dyn RecordStore) -> Result<RelayOutcome> {
        info!("> Reading hot posts from r/{}", self.feed_name);
        let submissions = self.feed.get_hot(&self.feed_name).await?;

        let candidates = filter_candidates(submissions, self.min_score)?;
        let chosen = select_candidate(&candidates, store)?;

        self.pipeline.relay(chosen, store).await
    }
}
