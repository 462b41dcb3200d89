use std::time::Duration;

use perscan_core::Platform;
use thiserror::Error;

/// Failures inside a platform fetcher.
///
/// These never cross [`crate::ReviewSource::fetch`]: the rendered message becomes
/// the `error` string of the returned `SourceResult`, so the user-facing variants
/// display their message verbatim.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Required API credential is not configured. No request was made.
    #[error("{0}")]
    MissingCredential(String),

    /// The product, app, video or subreddit does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Rate limit or quota exhausted.
    #[error("{0}")]
    RateLimited(String),

    /// Credential rejected or resource not accessible.
    #[error("{0}")]
    Unauthorized(String),

    /// Error reported in the platform's response body.
    #[error("{0}")]
    Api(String),

    /// Network or TLS failure, or a non-2xx status without a specific mapping.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed as JSON but not in the expected shape.
    #[error("unexpected response from {platform}: {reason}")]
    Malformed { platform: Platform, reason: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{platform} request timed out after {timeout:?}")]
    Timeout { platform: Platform, timeout: Duration },
}
