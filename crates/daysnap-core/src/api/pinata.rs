//! Pinata client for pinning snapshot files and metadata to IPFS.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::SnapshotMetadata;
use crate::snapshot::SnapshotStorage;

use super::http::{parse_json, send_with_retry, REQUEST_TIMEOUT_SECS};
use super::ApiError;

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";

const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";

/// Upper bound of the random suffix in pinned file names
const NAME_SUFFIX_RANGE: u32 = 10_000;

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pin_size: u64,
}

/// Pinata API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PinataClient {
    client: Client,
    api_url: String,
    gateway: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(
        api_url: impl Into<String>,
        gateway: impl Into<String>,
        jwt: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            gateway: normalize_gateway(&gateway.into()),
            jwt: jwt.into(),
        })
    }

    pub fn from_config(config: &Config, jwt: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(&config.pinata_api_url, &config.pinata_gateway, jwt)
    }

    /// Public URL of a pinned object
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("https://{}/ipfs/{}", self.gateway, cid)
    }

    /// Pin an image file and return its CID.
    pub async fn pin_file(&self, path: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = random_name("image", "jpg");
        let content_type = content_type_for(path);
        let url = format!("{}{}", self.api_url, PIN_FILE_PATH);
        debug!(path = %path.display(), size = bytes.len(), name = %file_name, "Pinning file");

        let response = send_with_retry(&url, || {
            let part = Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str(content_type)?;
            Ok(self
                .client
                .post(&url)
                .bearer_auth(&self.jwt)
                .multipart(Form::new().part("file", part)))
        })
        .await?;

        let pinned: PinResponse = parse_json(response, "pin file response").await?;
        info!(cid = %pinned.ipfs_hash, size = pinned.pin_size, "Pinned image");
        Ok(pinned.ipfs_hash)
    }

    /// Pin a snapshot metadata document and return its CID.
    pub async fn pin_metadata(&self, metadata: &SnapshotMetadata) -> Result<String, ApiError> {
        let body = metadata_body(metadata, &random_name("metadata", "json"));
        let url = format!("{}{}", self.api_url, PIN_JSON_PATH);

        let response = send_with_retry(&url, || {
            Ok(self.client.post(&url).bearer_auth(&self.jwt).json(&body))
        })
        .await?;

        let pinned: PinResponse = parse_json(response, "pin JSON response").await?;
        info!(cid = %pinned.ipfs_hash, "Pinned metadata");
        Ok(pinned.ipfs_hash)
    }

    /// Fetch a metadata document from a gateway URL.
    pub async fn fetch_metadata(&self, uri: &str) -> Result<SnapshotMetadata, ApiError> {
        let response = send_with_retry(uri, || Ok(self.client.get(uri))).await?;
        parse_json(response, "snapshot metadata").await
    }
}

#[async_trait]
impl SnapshotStorage for PinataClient {
    async fn pin_file(&self, path: &Path) -> Result<String, ApiError> {
        PinataClient::pin_file(self, path).await
    }

    async fn pin_metadata(&self, metadata: &SnapshotMetadata) -> Result<String, ApiError> {
        PinataClient::pin_metadata(self, metadata).await
    }

    async fn fetch_metadata(&self, uri: &str) -> Result<SnapshotMetadata, ApiError> {
        PinataClient::fetch_metadata(self, uri).await
    }

    fn gateway_url(&self, cid: &str) -> String {
        PinataClient::gateway_url(self, cid)
    }
}

/// Strip scheme and trailing slashes so the host can be templated
fn normalize_gateway(gateway: &str) -> String {
    gateway
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// `<prefix>_<unix millis>_<random>.<ext>`
fn random_name(prefix: &str, extension: &str) -> String {
    let suffix = rand::thread_rng().gen_range(0..NAME_SUFFIX_RANGE);
    format!("{}_{}_{}.{}", prefix, Utc::now().timestamp_millis(), suffix, extension)
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

fn metadata_body(metadata: &SnapshotMetadata, name: &str) -> serde_json::Value {
    serde_json::json!({
        "pinataContent": metadata,
        "pinataMetadata": { "name": name },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_url_normalized() {
        let client = PinataClient::new("https://api.pinata.cloud/", "https://my.gateway.io/", "jwt")
            .unwrap();
        assert_eq!(client.gateway_url("bafy123"), "https://my.gateway.io/ipfs/bafy123");
        assert_eq!(client.api_url, "https://api.pinata.cloud");

        let client = PinataClient::new("https://api.pinata.cloud", "my.gateway.io", "jwt").unwrap();
        assert_eq!(client.gateway_url("bafy123"), "https://my.gateway.io/ipfs/bafy123");
    }

    #[test]
    fn test_random_name_format() {
        let name = random_name("image", "jpg");
        let parts: Vec<&str> = name.trim_end_matches(".jpg").split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "image");
        assert!(parts[1].parse::<i64>().is_ok());
        assert!(parts[2].parse::<u32>().unwrap() < NAME_SUFFIX_RANGE);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_metadata_body() {
        let metadata = SnapshotMetadata {
            name: "18.10.2026".to_string(),
            description: "1792324800000".to_string(),
            image_cid: "bafyimage".to_string(),
        };
        let body = metadata_body(&metadata, "metadata_1_2.json");
        assert_eq!(body["pinataContent"]["imageCID"], "bafyimage");
        assert_eq!(body["pinataContent"]["description"], "1792324800000");
        assert_eq!(body["pinataMetadata"]["name"], "metadata_1_2.json");
    }

    #[test]
    fn test_parse_pin_response() {
        let json = r#"{"IpfsHash":"bafkreih5aznjvttude6c3wbvqeebb6rlx5wkbzyppv7garjiubll2ceym4","PinSize":1234,"Timestamp":"2026-10-18T12:00:00.000Z"}"#;
        let resp: PinResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.ipfs_hash, "bafkreih5aznjvttude6c3wbvqeebb6rlx5wkbzyppv7garjiubll2ceym4");
        assert_eq!(resp.pin_size, 1234);
    }

    #[tokio::test]
    async fn test_pin_missing_file_is_file_error() {
        let client = PinataClient::new("http://127.0.0.1:9", "gw", "jwt").unwrap();
        let err = client
            .pin_file(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::File { .. }));
    }
}
