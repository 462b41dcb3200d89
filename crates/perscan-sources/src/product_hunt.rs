//! Product Hunt comments through the v2 GraphQL API.
//!
//! Comments carry no individual rating; the post's aggregate `reviewsRating`
//! and `commentsCount` are reported instead.

use async_trait::async_trait;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SourceResult};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error::SourceError;
use crate::http::{build_client, date_prefix, read_json, DEFAULT_USER_AGENT};
use crate::source::ReviewSource;

const DEFAULT_BASE_URL: &str = "https://api.producthunt.com/v2/api/graphql";
const MAX_COMMENTS: usize = 100;
const MISSING_TOKEN_MESSAGE: &str =
    "PRODUCT_HUNT_API_TOKEN not configured. Get one from https://api.producthunt.com/v2/docs";

const POST_QUERY: &str = r"
query PostComments($slug: String!, $first: Int!) {
  post(slug: $slug) {
    id
    name
    commentsCount
    reviewsRating
    comments(first: $first) {
      edges {
        node {
          id
          body
          createdAt
          votesCount
          user { name username }
        }
      }
    }
  }
}
";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PostData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    comments_count: Option<usize>,
    reviews_rating: Option<f64>,
    comments: Option<Connection>,
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: CommentNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    #[serde(default)]
    id: String,
    body: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    votes_count: i64,
    user: Option<CommentUser>,
}

#[derive(Debug, Deserialize)]
struct CommentUser {
    name: Option<String>,
    username: Option<String>,
}

pub struct ProductHuntSource {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl ProductHuntSource {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SourcesConfig) -> Result<Self, SourceError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// `base_url` is the full GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built, or
    /// [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(config: &SourcesConfig, base_url: &str) -> Result<Self, SourceError> {
        let endpoint = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: build_client(DEFAULT_USER_AGENT, config.request_timeout_secs)?,
            endpoint,
            api_token: config.product_hunt_api_token.clone(),
        })
    }
}

#[async_trait]
impl ReviewSource for ProductHuntSource {
    fn platform(&self) -> Platform {
        Platform::ProductHunt
    }

    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError> {
        let Some(token) = self.api_token.as_deref() else {
            return Err(SourceError::MissingCredential(MISSING_TOKEN_MESSAGE.to_string()));
        };

        let body = json!({
            "query": POST_QUERY,
            "variables": { "slug": identifier, "first": count.min(MAX_COMMENTS) },
        });
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(SourceError::Unauthorized(
                    "Invalid or expired API token".to_string(),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(SourceError::RateLimited(
                    "Rate limit exceeded. Try again later.".to_string(),
                ));
            }
            _ => {}
        }
        let response = response.error_for_status()?;
        let payload: GraphQlResponse = read_json(response, "Product Hunt post query").await?;
        parse_post(identifier, payload)
    }
}

fn parse_post(slug: &str, payload: GraphQlResponse) -> Result<SourceResult, SourceError> {
    if let Some(first) = payload.errors.into_iter().next() {
        return Err(SourceError::Api(
            first.message.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    let Some(post) = payload.data.and_then(|d| d.post) else {
        return Err(SourceError::NotFound(format!(
            "Product '{slug}' not found on Product Hunt"
        )));
    };

    let reviews: Vec<NormalizedReview> = post
        .comments
        .map(|c| c.edges)
        .unwrap_or_default()
        .into_iter()
        .map(|edge| to_review(edge.node))
        .collect();
    let total = post.comments_count.unwrap_or(reviews.len());
    let rating = post.reviews_rating.unwrap_or(0.0);

    Ok(SourceResult::success(Platform::ProductHunt, slug, reviews)
        .with_reported_total(total)
        .with_reported_rating(rating))
}

fn to_review(node: CommentNode) -> NormalizedReview {
    let user = node
        .user
        .and_then(|u| {
            u.name
                .filter(|n| !n.is_empty())
                .or(u.username.filter(|n| !n.is_empty()))
        })
        .unwrap_or_else(|| "Anonymous".to_string());
    NormalizedReview {
        id: node.id,
        user,
        rating: None,
        comment: node.body.unwrap_or_default(),
        date: node.created_at.as_deref().map(date_prefix).unwrap_or_default(),
        platform: Platform::ProductHunt,
        likes: node.votes_count,
    }
}
