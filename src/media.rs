//! Media fetching and the content-type allow-list.
//!
//! The fetch is split in two so the pipeline can inspect status and content
//! type before anything is written to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;

use crate::error::{RelayError, Result};

/// Image types that can be relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Gif,
    Jpeg,
    Png,
}

impl MediaType {
    /// Match a declared content type against the allow-list.
    ///
    /// Comparison is case-insensitive and ignores parameters such as
    /// `; charset=binary`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/gif" => Some(MediaType::Gif),
            "image/jpeg" => Some(MediaType::Jpeg),
            "image/png" => Some(MediaType::Png),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Gif => "image/gif",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }

    /// File extension implied by the content type.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Gif => "gif",
            MediaType::Jpeg => "jpeg",
            MediaType::Png => "png",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime())
    }
}

/// Local path a submission's media is downloaded to.
pub fn download_path(tmp_dir: &Path, submission_id: &str, media_type: MediaType) -> PathBuf {
    tmp_dir.join(format!("{}.{}", submission_id, media_type.extension()))
}

/// An opened media response whose body has not been read yet.
#[async_trait]
pub trait MediaResponse: Send {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Declared content type, lowercased, if the header is present.
    fn content_type(&self) -> Option<String>;

    /// Stream the body into `path`, returning the byte count.
    async fn save_to(self: Box<Self>, path: &Path) -> Result<u64>;
}

/// Opens media URLs.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Box<dyn MediaResponse>>;
}

/// reqwest-backed media fetcher.
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Box<dyn MediaResponse>> {
        log::debug!("Fetching media from {}", url);
        let response = self.client.get(url).send().await?;
        Ok(Box::new(HttpMediaResponse { response }))
    }
}

struct HttpMediaResponse {
    response: reqwest::Response,
}

#[async_trait]
impl MediaResponse for HttpMediaResponse {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn content_type(&self) -> Option<String> {
        self.response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
    }

    async fn save_to(self: Box<Self>, path: &Path) -> Result<u64> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = self.response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(RelayError::Http)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_allow_list() {
        assert_eq!(MediaType::from_content_type("image/gif"), Some(MediaType::Gif));
        assert_eq!(MediaType::from_content_type("image/jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_content_type("IMAGE/PNG"), Some(MediaType::Png));
        assert_eq!(MediaType::from_content_type("image/png; charset=binary"), Some(MediaType::Png));
        assert_eq!(MediaType::from_content_type("text/html"), None);
        assert_eq!(MediaType::from_content_type("image/webp"), None);
        assert_eq!(MediaType::from_content_type("video/mp4"), None);
        assert_eq!(MediaType::from_content_type(""), None);
    }

    #[test]
    fn test_download_path() {
        let path = download_path(Path::new("./tmp"), "abc123", MediaType::Jpeg);
        assert_eq!(path, PathBuf::from("./tmp/abc123.jpeg"));
    }

    #[tokio::test]
    async fn test_http_fetch_and_save() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/y.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![1u8, 2, 3, 4, 5]),
            )
            .mount(&server)
            .await;

        let fetcher = HttpMediaFetcher::new("hotrelay-test", Duration::from_secs(5)).unwrap();
        let response = fetcher.fetch(&format!("{}/y.png", server.uri())).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.content_type().as_deref(), Some("image/png"));

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("sub/y.png");
        let written = response.save_to(&file).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&file).unwrap(), vec![1u8, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_http_fetch_reports_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpMediaFetcher::new("hotrelay-test", Duration::from_secs(5)).unwrap();
        let response = fetcher.fetch(&format!("{}/missing.png", server.uri())).await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
