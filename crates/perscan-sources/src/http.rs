//! Shared HTTP plumbing for the platform fetchers.

use std::time::Duration;

use chrono::DateTime;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::SourceError;

pub(crate) const DEFAULT_USER_AGENT: &str = "perscan/0.1 (review-aggregation)";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Builds the per-source `reqwest` client.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the TLS backend cannot be initialised.
pub(crate) fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses a base URL, forcing exactly one trailing slash so that
/// [`Url::join`] appends to the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, SourceError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SourceError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, SourceError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| SourceError::InvalidBaseUrl {
            url: format!("{base}{path}"),
            reason: e.to_string(),
        })
}

/// Reads the body and deserializes it, naming `context` on failure.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, SourceError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| SourceError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// `YYYY-MM-DD` for a Unix timestamp in seconds, or empty when out of range.
pub(crate) fn date_from_unix(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// The leading `YYYY-MM-DD` of an ISO-8601 timestamp.
pub(crate) fn date_prefix(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}
