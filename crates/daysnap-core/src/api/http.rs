use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::ApiError;

/// HTTP request timeout in seconds.
/// Image uploads over mobile links can be slow; 60s leaves room for them.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if response is successful, returning an error with body if not.
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

/// Send a request, backing off exponentially while the server answers 429.
///
/// `build` is called once per attempt since request bodies (multipart forms
/// in particular) cannot be replayed.
pub(crate) async fn send_with_retry<F>(url: &str, build: F) -> Result<Response, ApiError>
where
    F: Fn() -> Result<RequestBuilder, ApiError>,
{
    let mut retries = 0;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        let response = build()?.send().await?;

        if response.status().as_u16() != 429 {
            return check_response(response).await;
        }

        retries += 1;
        if retries > MAX_RATE_LIMIT_RETRIES {
            return Err(ApiError::RateLimited);
        }
        warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms *= 2; // Exponential backoff
    }
}

/// Parse a JSON body, keeping the raw text in the error for diagnosis.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
}
