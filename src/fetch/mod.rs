//! HTTP reads against the backend.
//!
//! Every failure is mapped onto [`FetchError`]: transport problems and
//! non-success statuses become `NetworkFailure`, undecodable bodies become
//! `MalformedResponse`.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// Characters of an error response body kept in the failure reason.
pub const MAX_ERROR_BODY: usize = 200;

/// GETs `url` and returns the body of a successful response.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    let parsed: reqwest::Url = url
        .parse()
        .map_err(|e| FetchError::network(url, format!("invalid url: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| FetchError::network(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let body = truncate_body(&body);
        return Err(FetchError::network(url, format!("status {status}: {body}")));
    }

    let bytes = resp.bytes().await.map_err(|e| FetchError::network(url, e))?;
    debug!(bytes = bytes.len(), "Response body received");
    Ok(bytes.to_vec())
}

/// GETs `url` and decodes the JSON body into `T`.
pub async fn fetch_json<C, T>(client: &C, url: &str) -> Result<T, FetchError>
where
    C: HttpClient,
    T: DeserializeOwned,
{
    let bytes = fetch_bytes(client, url).await?;
    decode_json(url, &bytes)
}

/// Decodes a JSON body, reporting shape mismatches as `MalformedResponse`.
pub fn decode_json<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(bytes).map_err(|e| FetchError::malformed(url, e))
}

/// Trims an error body to [`MAX_ERROR_BODY`] characters, marking the cut.
pub fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
