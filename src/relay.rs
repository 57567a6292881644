//! Relay pipeline: fetch, validate, download, caption, publish, commit.
//!
//! Any failure ends the run. An unsupported content type ends it quietly
//! with `RelayOutcome::Skipped` and leaves the record unprocessed, so the
//! same submission stays eligible on later runs.

use std::path::PathBuf;

use log::{info, warn};

use crate::caption::{WordFilter, build_caption};
use crate::domain::{RelayOutcome, Submission};
use crate::error::{RelayError, Result};
use crate::media::{MediaFetcher, MediaType, download_path};
use crate::store::RecordStore;
use crate::twitter::Publisher;

/// Relays one chosen submission to the publisher.
pub struct RelayPipeline {
    fetcher: Box<dyn MediaFetcher>,
    publisher: Box<dyn Publisher>,
    feed_name: String,
    tmp_dir: PathBuf,
    word_filter: WordFilter,
}

impl RelayPipeline {
    pub fn new(
        fetcher: Box<dyn MediaFetcher>,
        publisher: Box<dyn Publisher>,
        feed_name: impl Into<String>,
        tmp_dir: impl Into<PathBuf>,
        word_filter: WordFilter,
    ) -> Self {
        Self {
            fetcher,
            publisher,
            feed_name: feed_name.into(),
            tmp_dir: tmp_dir.into(),
            word_filter,
        }
    }

    /// Relay `submission` and mark it processed on success.
    pub async fn relay(&self, submission: &Submission, store: &mut dyn RecordStore) -> Result<RelayOutcome> {
        // status 0: no request was made
        let url = submission.media_url().ok_or_else(|| RelayError::Fetch {
            url: submission.permalink(),
            status: 0,
        })?;

        let response = self.fetcher.fetch(url).await?;
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(RelayError::Fetch {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response.content_type().unwrap_or_default();
        let Some(media_type) = MediaType::from_content_type(&content_type) else {
            warn!("> Aborting post {} since it is {}", submission.id, display_type(&content_type));
            return Ok(RelayOutcome::Skipped {
                submission_id: submission.id.clone(),
                content_type,
            });
        };

        let file = download_path(&self.tmp_dir, &submission.id, media_type);
        let bytes = response.save_to(&file).await?;
        info!("> Finished downloading image from Reddit ({} bytes to {})", bytes, file.display());

        let caption = build_caption(submission, &self.feed_name, &self.word_filter);

        let media_id = self.publisher.upload_media(&file, media_type).await?;
        let posted = self.publisher.post_status(&caption, &[media_id]).await?;
        let status_url = posted.url();
        info!("> Posted Tweet: {}", status_url);

        store.mark_processed(&submission.id)?;

        Ok(RelayOutcome::Published {
            submission_id: submission.id.clone(),
            status_url,
        })
    }
}

fn display_type(content_type: &str) -> &str {
    if content_type.is_empty() { "of unknown type" } else { content_type }
}
