//! Reddit comments from the public `.json` endpoints (no OAuth).
//!
//! An identifier containing `/` names a thread (or a listing path such as
//! `r/rust`); a bare name is treated as a subreddit whose hot posts are walked
//! for comments.

use async_trait::async_trait;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SourceResult};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;
use crate::http::{build_client, date_from_unix, endpoint, parse_base_url, read_json};
use crate::source::ReviewSource;

const DEFAULT_BASE_URL: &str = "https://www.reddit.com/";
const HOT_LISTING_LIMIT: usize = 25;
const MAX_POSTS: usize = 10;
const COMMENTS_PER_POST: usize = 10;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    #[serde(default)]
    kind: String,
    data: ThingData,
}

/// Fields shared by posts (`t3`) and comments (`t1`); each kind fills its own.
#[derive(Debug, Deserialize)]
struct ThingData {
    id: Option<String>,
    author: Option<String>,
    body: Option<String>,
    created_utc: Option<f64>,
    score: Option<i64>,
    permalink: Option<String>,
}

pub struct RedditSource {
    client: Client,
    base_url: Url,
}

impl RedditSource {
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
            client: build_client(&config.reddit_user_agent, config.request_timeout_secs)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    async fn fetch_json(
        &self,
        path: &str,
        limit: usize,
        identifier: &str,
    ) -> Result<Value, SourceError> {
        let url = endpoint(&self.base_url, path)?;
        let response = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(SourceError::NotFound(format!(
                    "Subreddit or post '{identifier}' not found"
                )));
            }
            StatusCode::FORBIDDEN => {
                return Err(SourceError::Unauthorized(
                    "Subreddit is private or banned".to_string(),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(SourceError::RateLimited(
                    "Rate limited. Try again later.".to_string(),
                ));
            }
            _ => {}
        }

        let body: Value = read_json(response.error_for_status()?, path).await?;
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string);
            return Err(SourceError::Api(format!("Reddit returned error: {message}")));
        }
        Ok(body)
    }

    /// Walks the first posts of a listing, collecting their top comments.
    /// Posts whose comments cannot be fetched are skipped.
    async fn comments_from_posts(
        &self,
        posts: Vec<Thing>,
        identifier: &str,
        count: usize,
    ) -> Vec<NormalizedReview> {
        let mut reviews = Vec::new();
        for post in posts.into_iter().take(MAX_POSTS) {
            let Some(permalink) = post.data.permalink.filter(|p| !p.is_empty()) else {
                continue;
            };
            let path = format!("{}.json", permalink.trim_matches('/'));
            let thread = match self.fetch_json(&path, COMMENTS_PER_POST, identifier).await {
                Ok(thread) => thread,
                Err(error) => {
                    tracing::debug!(
                        permalink = %permalink,
                        error = %error,
                        "skipping Reddit post"
                    );
                    continue;
                }
            };
            let Ok(comments) = thread_comments(thread) else {
                continue;
            };

            for review in comments
                .into_iter()
                .take(COMMENTS_PER_POST)
                .filter_map(to_review)
            {
                reviews.push(review);
                if reviews.len() >= count {
                    return reviews;
                }
            }
        }
        reviews
    }
}

#[async_trait]
impl ReviewSource for RedditSource {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError> {
        let trimmed = identifier.trim_matches('/');
        let body = if trimmed.contains('/') {
            self.fetch_json(&format!("{trimmed}.json"), count, identifier)
                .await?
        } else {
            self.fetch_json(&format!("r/{trimmed}/hot.json"), HOT_LISTING_LIMIT, identifier)
                .await?
        };

        let mut reviews = if body.is_array() {
            thread_comments(body)?
                .into_iter()
                .take(count)
                .filter_map(to_review)
                .collect()
        } else {
            let listing: Listing = parse_value(body, "Reddit listing")?;
            if listing.data.children.is_empty() {
                let name = trimmed.trim_start_matches("r/");
                return Err(SourceError::NotFound(format!(
                    "Subreddit 'r/{name}' not found or empty"
                )));
            }
            self.comments_from_posts(listing.data.children, identifier, count)
                .await
        };

        reviews.truncate(count);
        Ok(SourceResult::success(Platform::Reddit, identifier, reviews))
    }
}

fn parse_value<T: serde::de::DeserializeOwned>(
    value: Value,
    context: &str,
) -> Result<T, SourceError> {
    serde_json::from_value(value).map_err(|source| SourceError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// A thread is `[post listing, comment listing]`; returns the comment things.
fn thread_comments(body: Value) -> Result<Vec<Thing>, SourceError> {
    let mut parts: Vec<Listing> = parse_value(body, "Reddit thread")?;
    if parts.len() < 2 {
        return Ok(Vec::new());
    }
    Ok(parts.swap_remove(1).data.children)
}

#[allow(clippy::cast_possible_truncation)]
fn to_review(thing: Thing) -> Option<NormalizedReview> {
    if thing.kind != "t1" {
        return None;
    }
    let data = thing.data;
    let body = data.body.filter(|b| !b.is_empty())?;
    Some(NormalizedReview {
        id: data.id.unwrap_or_default(),
        user: data.author.unwrap_or_else(|| "Anonymous".to_string()),
        rating: None,
        comment: body,
        date: data
            .created_utc
            .map(|ts| date_from_unix(ts as i64))
            .unwrap_or_default(),
        platform: Platform::Reddit,
        likes: data.score.unwrap_or(0),
    })
}
