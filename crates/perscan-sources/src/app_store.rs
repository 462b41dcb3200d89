//! iOS App Store reviews from the iTunes customer-reviews feed.

use async_trait::async_trait;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SourceResult};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::SourceError;
use crate::http::{
    build_client, date_prefix, endpoint, parse_base_url, read_json, DEFAULT_USER_AGENT,
};
use crate::source::ReviewSource;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com/";
/// The feed serves at most ten pages of fifty reviews.
const MAX_FEED_PAGES: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    result_count: u64,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Option<OneOrMany<FeedEntry>>,
}

/// The feed collapses a single-entry list into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Label {
    label: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Label,
    author: Option<Author>,
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    title: Option<Label>,
    content: Option<Label>,
    updated: Option<Label>,
}

pub struct AppStoreSource {
    client: Client,
    base_url: Url,
    country: String,
}

impl AppStoreSource {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SourcesConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(config: &SourcesConfig, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(DEFAULT_USER_AGENT, config.request_timeout_secs)?,
            base_url: parse_base_url(base_url)?,
            country: config.ios_app_store_country.clone(),
        })
    }

    async fn app_exists(&self, app_id: &str) -> Result<bool, SourceError> {
        let url = endpoint(&self.base_url, "lookup")?;
        let response = self
            .client
            .get(url)
            .query(&[("id", app_id), ("country", self.country.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let lookup: LookupResponse = read_json(response, "iTunes lookup").await?;
        Ok(lookup.result_count > 0)
    }

    async fn fetch_feed_page(
        &self,
        app_id: &str,
        page: u32,
    ) -> Result<Vec<NormalizedReview>, SourceError> {
        let path = format!(
            "{}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json",
            self.country
        );
        let url = endpoint(&self.base_url, &path)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let feed: FeedResponse = read_json(response, "App Store review feed").await?;
        Ok(parse_feed(feed))
    }
}

#[async_trait]
impl ReviewSource for AppStoreSource {
    fn platform(&self) -> Platform {
        Platform::IosAppStore
    }

    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError> {
        let numeric = !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit());
        if !numeric || !self.app_exists(identifier).await? {
            return Err(SourceError::NotFound(format!(
                "App with ID '{identifier}' not found on iOS App Store"
            )));
        }

        let mut reviews = Vec::new();
        for page in 1..=MAX_FEED_PAGES {
            let batch = match self.fetch_feed_page(identifier, page).await {
                Ok(batch) => batch,
                // Past the last page the feed answers with an error status.
                Err(SourceError::Http(e)) if page > 1 && e.is_status() => break,
                Err(e) => return Err(e),
            };
            if batch.is_empty() {
                break;
            }
            reviews.extend(batch);
            tracing::debug!(
                app_id = identifier,
                page,
                total = reviews.len(),
                "fetched App Store page"
            );
            if reviews.len() >= count {
                break;
            }
        }

        reviews.truncate(count);
        Ok(SourceResult::success(Platform::IosAppStore, identifier, reviews))
    }
}

/// Entries without a star rating describe the app itself, not a review.
fn parse_feed(response: FeedResponse) -> Vec<NormalizedReview> {
    response
        .feed
        .entry
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let rating = entry.rating?.label.parse::<f64>().ok()?;
            let content = entry.content.map(|c| c.label).unwrap_or_default();
            let comment = match entry.title.map(|t| t.label) {
                Some(title) if !title.is_empty() => format!("{title}: {content}"),
                _ => content,
            };
            Some(NormalizedReview {
                id: entry.id.label,
                user: entry
                    .author
                    .and_then(|a| a.name)
                    .map(|n| n.label)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Anonymous".to_string()),
                rating: Some(rating),
                comment,
                date: entry.updated.map(|u| date_prefix(&u.label)).unwrap_or_default(),
                platform: Platform::IosAppStore,
                likes: 0,
            })
        })
        .collect()
}
