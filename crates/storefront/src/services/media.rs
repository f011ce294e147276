//! Client for a Cloudinary-compatible image host.
//!
//! Only two calls are made: a signed upload and a signed destroy. Requests are
//! signed with SHA-256 over the sorted parameters followed by the API secret.

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::config::MediaConfig;

/// Image host API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Extracts the public ID from a delivery URL.
static PUBLIC_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"upload/(?:v\d+/)?(.+)\.(?:jpg|jpeg|png|webp|avif)").expect("Invalid regex")
});

/// Errors that can occur when talking to the image host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The URL does not point at an uploaded image.
    #[error("Invalid image URL")]
    InvalidUrl,
}

/// Image host client.
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    config: MediaConfig,
}

impl MediaClient {
    /// Create a new image host client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// Upload an image into the configured folder.
    ///
    /// Returns the host's JSON result unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Api` if the host rejects the upload.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: String,
    ) -> Result<serde_json::Value, MediaError> {
        let timestamp = unix_timestamp().to_string();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            self.config.api_secret.expose_secret(),
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let url = format!("{BASE_URL}/{}/image/upload", self.config.cloud_name);
        let response = self.client.post(&url).multipart(form).send().await?;
        let result = check(response).await?.json().await?;

        tracing::info!("Image uploaded");
        Ok(result)
    }

    /// Delete an image by public ID.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Api` if the host rejects the request.
    #[instrument(skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = unix_timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            self.config.api_secret.expose_secret(),
        );

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let url = format!("{BASE_URL}/{}/image/destroy", self.config.cloud_name);
        let response = self.client.post(&url).form(&params).send().await?;
        check(response).await?;

        tracing::info!("Image destroyed");
        Ok(())
    }

    /// Delete the image behind a delivery URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::InvalidUrl` if no public ID can be extracted.
    pub async fn destroy_url(&self, url: &str) -> Result<(), MediaError> {
        let public_id = public_id_from_url(url).ok_or(MediaError::InvalidUrl)?;
        self.destroy(public_id).await
    }
}

/// Extract the public ID (folder and name, no extension) from a delivery URL.
///
/// `https://res.cloudinary.com/demo/image/upload/v1712/shopfront/teapot.png`
/// yields `shopfront/teapot`.
#[must_use]
pub fn public_id_from_url(url: &str) -> Option<&str> {
    PUBLIC_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Sign request parameters: `k1=v1&k2=v2` sorted by key, then the secret, SHA-256 hex.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(MediaError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url(
                "https://res.cloudinary.com/demo/image/upload/v1712345678/shopfront/teapot.png"
            ),
            Some("shopfront/teapot")
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/shopfront/mug.webp"),
            Some("shopfront/mug")
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/v1/a.jpeg"),
            Some("a")
        );
    }

    #[test]
    fn test_public_id_rejects_foreign_urls() {
        assert_eq!(public_id_from_url("https://example.com/teapot.png"), None);
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/v1/doc.pdf"),
            None
        );
        assert_eq!(public_id_from_url(""), None);
    }

    #[test]
    fn test_sign_sorts_params() {
        let expected = "d08d879168730defe0ba307d702b563234144d9384f60fea07821f8e38a2fd77";
        assert_eq!(
            sign(
                &[("timestamp", "1700000000"), ("folder", "shopfront")],
                "abcd"
            ),
            expected
        );
        assert_eq!(
            sign(
                &[("folder", "shopfront"), ("timestamp", "1700000000")],
                "abcd"
            ),
            expected
        );
    }

    #[test]
    fn test_sign_destroy_params() {
        assert_eq!(
            sign(
                &[("public_id", "shopfront/teapot"), ("timestamp", "1700000000")],
                "abcd"
            ),
            "a6736f483b762c6ccd9d3c741ea50d5a6a0d1b736bd6954512a10f7397420539"
        );
    }
}
