//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Signature parameters are the oauth_* values plus any query or
//! form-encoded body parameters. Multipart bodies are not signed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::Sha1;

use crate::config::TwitterConfig;
use crate::error::{RelayError, Result};

type HmacSha1 = Hmac<Sha1>;

/// User-context credentials for the posting account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl OAuthCredentials {
    /// Resolve credentials from the variables named in `config`.
    pub fn resolve<F>(config: &TwitterConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).ok_or_else(|| RelayError::Config(format!("{} not set", name)));

        Ok(Self {
            consumer_key: get(&config.consumer_key_env)?,
            consumer_secret: get(&config.consumer_secret_env)?,
            token: get(&config.access_token_env)?,
            token_secret: get(&config.access_token_secret_env)?,
        })
    }

    /// Build an `Authorization` header value with a fresh nonce and timestamp.
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(String, String)]) -> Result<String> {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    /// Build an `Authorization` header value for a fixed nonce and timestamp.
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];

        let mut all_params = oauth_params.clone();
        all_params.extend(params.iter().cloned());

        let base = signature_base(method, url, &all_params);
        let signature = sign(&base, &self.consumer_secret, &self.token_secret)?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }
}

/// RFC 3986 percent-encoding (unreserved characters pass through).
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `METHOD&encoded-url&encoded-sorted-params`
pub fn signature_base(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}&{}&{}", method.to_ascii_uppercase(), encode(url), encode(&param_string))
}

/// HMAC-SHA1 over the signature base, base64 encoded.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| RelayError::Publish(format!("Failed to initialise signer: {}", e)))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
