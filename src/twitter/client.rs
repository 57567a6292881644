//! Twitter API client implementing `Publisher`.
//!
//! Media goes through the chunked upload endpoint (INIT, APPEND, FINALIZE,
//! and STATUS polling when the server processes the file), then a status
//! update references the uploaded media id.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::TwitterConfig;
use crate::error::{RelayError, Result};
use crate::media::MediaType;
use crate::twitter::oauth::OAuthCredentials;

/// Maximum STATUS polls before giving up on media processing.
const MAX_STATUS_POLLS: u32 = 20;

/// Target account for relayed media.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload a local media file, returning the media id.
    async fn upload_media(&self, path: &Path, media_type: MediaType) -> Result<String>;

    /// Post a status referencing uploaded media.
    async fn post_status(&self, text: &str, media_ids: &[String]) -> Result<PostedStatus>;
}

/// A status that was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedStatus {
    pub id: String,
    pub screen_name: String,
}

impl PostedStatus {
    /// Public URL of the status.
    pub fn url(&self) -> String {
        format!("https://twitter.com/{}/status/{}", self.screen_name, self.id)
    }
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    media_id_string: String,
    #[serde(default)]
    processing_info: Option<ProcessingInfo>,
}

#[derive(Debug, Deserialize)]
struct ProcessingInfo {
    state: String,
    #[serde(default)]
    check_after_secs: Option<u64>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    id_str: String,
    user: StatusUser,
}

#[derive(Debug, Deserialize)]
struct StatusUser {
    screen_name: String,
}

/// Twitter API client
pub struct TwitterClient {
    client: Client,
    credentials: OAuthCredentials,
    upload_endpoint: String,
    status_endpoint: String,
    chunk_size: usize,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig, credentials: OAuthCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RelayError::Publish(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            upload_endpoint: format!("{}/1.1/media/upload.json", config.upload_url.trim_end_matches('/')),
            status_endpoint: format!("{}/1.1/statuses/update.json", config.api_url.trim_end_matches('/')),
            chunk_size: config.chunk_size.max(1),
        })
    }

    /// POST a signed form-encoded request.
    async fn post_form(&self, url: &str, params: Vec<(String, String)>) -> Result<reqwest::Response> {
        let auth = self.credentials.authorization_header("POST", url, &params)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .form(&params)
            .send()
            .await
            .map_err(|e| RelayError::Publish(format!("Request to {} failed: {}", url, e)))?;
        check_status(response).await
    }

    /// GET a signed request with query parameters.
    async fn get_signed(&self, url: &str, params: Vec<(String, String)>) -> Result<reqwest::Response> {
        let auth = self.credentials.authorization_header("GET", url, &params)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .query(&params)
            .send()
            .await
            .map_err(|e| RelayError::Publish(format!("Request to {} failed: {}", url, e)))?;
        check_status(response).await
    }

    async fn init_upload(&self, total_bytes: usize, media_type: MediaType) -> Result<String> {
        let response = self
            .post_form(
                &self.upload_endpoint,
                vec![
                    ("command".to_string(), "INIT".to_string()),
                    ("total_bytes".to_string(), total_bytes.to_string()),
                    ("media_type".to_string(), media_type.mime().to_string()),
                ],
            )
            .await?;
        let init: MediaResponse = parse_json(response).await?;
        Ok(init.media_id_string)
    }

    async fn append_chunk(&self, media_id: &str, segment_index: usize, chunk: Vec<u8>) -> Result<()> {
        // Multipart bodies are excluded from the signature.
        let auth = self.credentials.authorization_header("POST", &self.upload_endpoint, &[])?;
        let form = Form::new()
            .text("command", "APPEND")
            .text("media_id", media_id.to_string())
            .text("segment_index", segment_index.to_string())
            .part("media", Part::bytes(chunk).file_name("media"));

        let response = self
            .client
            .post(&self.upload_endpoint)
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::Publish(format!("APPEND segment {} failed: {}", segment_index, e)))?;
        check_status(response).await?;
        Ok(())
    }

    async fn finalize_upload(&self, media_id: &str) -> Result<Option<ProcessingInfo>> {
        let response = self
            .post_form(
                &self.upload_endpoint,
                vec![
                    ("command".to_string(), "FINALIZE".to_string()),
                    ("media_id".to_string(), media_id.to_string()),
                ],
            )
            .await?;
        let finalized: MediaResponse = parse_json(response).await?;
        Ok(finalized.processing_info)
    }

    /// Poll until server-side processing finishes.
    async fn await_processing(&self, media_id: &str, mut info: ProcessingInfo) -> Result<()> {
        for _ in 0..MAX_STATUS_POLLS {
            match info.state.as_str() {
                "succeeded" => return Ok(()),
                "failed" => {
                    return Err(RelayError::Publish(format!(
                        "Media {} processing failed: {}",
                        media_id,
                        info.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                    )));
                }
                state => {
                    let wait = info.check_after_secs.unwrap_or(1);
                    debug!("Media {} is {}, checking again in {}s", media_id, state, wait);
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
            }

            let response = self
                .get_signed(
                    &self.upload_endpoint,
                    vec![
                        ("command".to_string(), "STATUS".to_string()),
                        ("media_id".to_string(), media_id.to_string()),
                    ],
                )
                .await?;
            let status: MediaResponse = parse_json(response).await?;
            match status.processing_info {
                Some(next) => info = next,
                None => return Ok(()),
            }
        }

        Err(RelayError::Publish(format!("Media {} still processing after {} checks", media_id, MAX_STATUS_POLLS)))
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    async fn upload_media(&self, path: &Path, media_type: MediaType) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RelayError::Publish(format!("Failed to read {}: {}", path.display(), e)))?;
        let media_id = self.init_upload(bytes.len(), media_type).await?;
        debug!("Initialised upload {} ({} bytes)", media_id, bytes.len());

        for (segment_index, chunk) in bytes.chunks(self.chunk_size).enumerate() {
            self.append_chunk(&media_id, segment_index, chunk.to_vec()).await?;
        }

        if let Some(info) = self.finalize_upload(&media_id).await? {
            self.await_processing(&media_id, info).await?;
        }

        info!("> Uploaded media {}", media_id);
        Ok(media_id)
    }

    async fn post_status(&self, text: &str, media_ids: &[String]) -> Result<PostedStatus> {
        let mut params = vec![("status".to_string(), text.to_string())];
        if !media_ids.is_empty() {
            params.push(("media_ids".to_string(), media_ids.join(",")));
        }

        let response = self.post_form(&self.status_endpoint, params).await?;
        let status: StatusResponse = parse_json(response).await?;

        Ok(PostedStatus {
            id: status.id_str,
            screen_name: status.user.screen_name,
        })
    }
}

/// Turn a non-success response into a `Publish` error carrying the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(RelayError::Publish(format!("Got response {} from {}: {}", status, url, body)))
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| RelayError::Publish(format!("Invalid response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UPLOAD_PATH: &str = "/1.1/media/upload.json";

    fn client_for(server: &MockServer, chunk_size: usize) -> TwitterClient {
        let config = TwitterConfig {
            upload_url: server.uri(),
            api_url: server.uri(),
            chunk_size,
            timeout_ms: 5_000,
            ..Default::default()
        };
        let credentials = OAuthCredentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            token: "t".to_string(),
            token_secret: "ts".to_string(),
        };
        TwitterClient::new(&config, credentials).unwrap()
    }

    fn media_file(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("abc123.png");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_posted_status_url() {
        let posted = PostedStatus {
            id: "42".to_string(),
            screen_name: "relaybot".to_string(),
        };
        assert_eq!(posted.url(), "https://twitter.com/relaybot/status/42");
    }

    #[tokio::test]
    async fn test_chunked_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(header_exists("authorization"))
            .and(body_string_contains("command=INIT"))
            .and(body_string_contains("media_type=image%2Fpng"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"media_id_string": "777"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(body_string_contains("APPEND"))
            .respond_with(ResponseTemplate::new(204))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(body_string_contains("command=FINALIZE"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"media_id_string": "777"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, b"0123456789");
        let client = client_for(&server, 4);

        let media_id = client.upload_media(&file, MediaType::Png).await.unwrap();
        assert_eq!(media_id, "777");
    }

    #[tokio::test]
    async fn test_upload_waits_for_processing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(body_string_contains("command=INIT"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"media_id_string": "888"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(body_string_contains("APPEND"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(body_string_contains("command=FINALIZE"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "media_id_string": "888",
                "processing_info": {"state": "pending", "check_after_secs": 0}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(UPLOAD_PATH))
            .and(query_param("command", "STATUS"))
            .and(query_param("media_id", "888"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "media_id_string": "888",
                "processing_info": {"state": "succeeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, b"GIF89a");
        let client = client_for(&server, 1024);

        let media_id = client.upload_media(&file, MediaType::Gif).await.unwrap();
        assert_eq!(media_id, "888");
    }

    #[tokio::test]
    async fn test_upload_failure_is_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"errors":[{"code":324}]}"#))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, b"data");
        let client = client_for(&server, 1024);

        let result = client.upload_media(&file, MediaType::Png).await;
        assert!(matches!(result, Err(RelayError::Publish(msg)) if msg.contains("400")));
    }

    #[tokio::test]
    async fn test_post_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .and(header_exists("authorization"))
            .and(body_string_contains("media_ids=777"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id_str": "1234567890",
                "text": "hello",
                "user": {"screen_name": "relaybot"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 1024);
        let posted = client.post_status("hello", &["777".to_string()]).await.unwrap();

        assert_eq!(posted.id, "1234567890");
        assert_eq!(posted.url(), "https://twitter.com/relaybot/status/1234567890");
    }

    #[tokio::test]
    async fn test_post_status_failure_is_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server, 1024);
        let result = client.post_status("hello", &[]).await;
        assert!(matches!(result, Err(RelayError::Publish(_))));
    }
}
