//! Google Play Store reviews through the Play web client's `batchexecute` RPC.
//!
//! No API key is needed. Each page is one `UsvDTd` call returning up to
//! [`MAX_PAGE_SIZE`] reviews sorted newest first plus a continuation token.

use async_trait::async_trait;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SourceResult};
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};

use crate::error::SourceError;
use crate::http::{build_client, date_from_unix, endpoint, parse_base_url, DEFAULT_USER_AGENT};
use crate::source::ReviewSource;

const DEFAULT_BASE_URL: &str = "https://play.google.com/";
const BATCH_EXECUTE_PATH: &str = "_/PlayStoreUi/data/batchexecute";
const REVIEWS_RPC: &str = "UsvDTd";
const SORT_NEWEST: u8 = 2;
pub(crate) const MAX_PAGE_SIZE: usize = 199;

pub struct GooglePlaySource {
    client: Client,
    base_url: Url,
    language: String,
    country: String,
}

impl GooglePlaySource {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SourcesConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Points the source at a different host (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(config: &SourcesConfig, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(DEFAULT_USER_AGENT, config.request_timeout_secs)?,
            base_url: parse_base_url(base_url)?,
            language: config.google_play_language.clone(),
            country: config.google_play_country.clone(),
        })
    }

    async fn fetch_page(
        &self,
        app_id: &str,
        page_size: usize,
        token: Option<&str>,
    ) -> Result<ReviewPage, SourceError> {
        let url = endpoint(&self.base_url, BATCH_EXECUTE_PATH)?;
        let response = self
            .client
            .post(url)
            .query(&[("hl", self.language.as_str()), ("gl", self.country.as_str())])
            .form(&[("f.req", request_payload(app_id, page_size, token))])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(format!(
                "App '{app_id}' not found on Google Play Store"
            )));
        }
        let body = response.error_for_status()?.text().await?;
        parse_page(&body)
    }
}

#[async_trait]
impl ReviewSource for GooglePlaySource {
    fn platform(&self) -> Platform {
        Platform::GooglePlay
    }

    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError> {
        let mut reviews: Vec<NormalizedReview> = Vec::new();
        let mut token: Option<String> = None;

        while reviews.len() < count {
            let page_size = (count - reviews.len()).min(MAX_PAGE_SIZE);
            let page = self.fetch_page(identifier, page_size, token.as_deref()).await?;
            let fetched = page.reviews.len();
            reviews.extend(page.reviews);
            tracing::debug!(
                app_id = identifier,
                fetched,
                total = reviews.len(),
                "fetched Google Play page"
            );

            match page.next_token {
                Some(next) if fetched > 0 => token = Some(next),
                _ => break,
            }
        }

        reviews.truncate(count);
        Ok(SourceResult::success(Platform::GooglePlay, identifier, reviews))
    }
}

/// The `f.req` form value for one page of reviews.
pub(crate) fn request_payload(app_id: &str, page_size: usize, token: Option<&str>) -> String {
    let inner = json!([
        null,
        null,
        [2, SORT_NEWEST, [page_size, null, token], null, []],
        [app_id, 7]
    ]);
    json!([[[REVIEWS_RPC, inner.to_string(), null, "generic"]]]).to_string()
}

#[derive(Debug, Default)]
pub(crate) struct ReviewPage {
    pub(crate) reviews: Vec<NormalizedReview>,
    pub(crate) next_token: Option<String>,
}

/// Parses a `batchexecute` response body.
///
/// The body is an anti-XSSI prefix followed by a JSON envelope whose first entry
/// holds the RPC result as a JSON string. A null result means no reviews.
pub(crate) fn parse_page(body: &str) -> Result<ReviewPage, SourceError> {
    let start = body.find('[').ok_or_else(|| SourceError::Malformed {
        platform: Platform::GooglePlay,
        reason: "response has no JSON envelope".to_string(),
    })?;
    let envelope: Value =
        serde_json::from_str(&body[start..]).map_err(|source| SourceError::Deserialize {
            context: "Google Play batchexecute envelope".to_string(),
            source,
        })?;

    let Some(payload) = envelope.pointer("/0/2").and_then(Value::as_str) else {
        return Ok(ReviewPage::default());
    };
    let data: Value = serde_json::from_str(payload).map_err(|source| SourceError::Deserialize {
        context: "Google Play review payload".to_string(),
        source,
    })?;

    let reviews = data
        .get(0)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_review).collect())
        .unwrap_or_default();

    let next_token = data.as_array().and_then(|parts| {
        let meta = parts.len().checked_sub(2).and_then(|i| parts.get(i))?;
        meta.as_array()?.last()?.as_str().map(str::to_string)
    });

    Ok(ReviewPage {
        reviews,
        next_token,
    })
}

fn parse_review(item: &Value) -> Option<NormalizedReview> {
    let id = item.get(0)?.as_str()?;
    let user = item
        .pointer("/1/0")
        .and_then(Value::as_str)
        .unwrap_or("Anonymous");
    let comment = item.get(4).and_then(Value::as_str).unwrap_or_default();
    let date = item
        .pointer("/5/0")
        .and_then(Value::as_i64)
        .map(date_from_unix)
        .unwrap_or_default();

    Some(NormalizedReview {
        id: id.to_string(),
        user: user.to_string(),
        rating: item.get(2).and_then(Value::as_f64),
        comment: comment.to_string(),
        date,
        platform: Platform::GooglePlay,
        likes: item.get(6).and_then(Value::as_i64).unwrap_or(0),
    })
}

#[cfg(test)]
#[path = "google_play_test.rs"]
mod tests;
