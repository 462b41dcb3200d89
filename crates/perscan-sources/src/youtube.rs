//! YouTube comments through the Data API v3.

use async_trait::async_trait;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SourceResult};
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::error::SourceError;
use crate::http::{
    build_client, date_prefix, endpoint, parse_base_url, read_json, DEFAULT_USER_AGENT,
};
use crate::source::ReviewSource;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const MAX_PAGE_SIZE: usize = 100;
const MISSING_KEY_MESSAGE: &str = "YOUTUBE_API_KEY not configured. Get one from \
     https://console.cloud.google.com/apis/library/youtube.googleapis.com";

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadPage {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    id: String,
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    author_display_name: Option<String>,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    like_count: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

pub struct YouTubeSource {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl YouTubeSource {
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
            api_key: config.youtube_api_key.clone(),
        })
    }

    async fn get(
        &self,
        path: &str,
        video_id: &str,
        params: &[(&str, &str)],
    ) -> Result<Response, SourceError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let url = endpoint(&self.base_url, path)?;
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", api_key)])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response, video_id).await)
        }
    }
}

#[async_trait]
impl ReviewSource for YouTubeSource {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError> {
        if self.api_key.is_none() {
            return Err(SourceError::MissingCredential(MISSING_KEY_MESSAGE.to_string()));
        }

        let videos = self
            .get("videos", identifier, &[("part", "snippet"), ("id", identifier)])
            .await?;
        let videos: VideoList = read_json(videos, "YouTube videos.list").await?;
        if videos.items.is_empty() {
            return Err(not_found(identifier));
        }

        let mut reviews = Vec::new();
        let mut page_token: Option<String> = None;
        while reviews.len() < count {
            let max_results = (count - reviews.len()).min(MAX_PAGE_SIZE).to_string();
            let mut params = vec![
                ("part", "snippet"),
                ("videoId", identifier),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
                ("order", "time"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = self.get("commentThreads", identifier, &params).await?;
            let page: CommentThreadPage =
                read_json(response, "YouTube commentThreads.list").await?;
            reviews.extend(page.items.into_iter().map(to_review));
            tracing::debug!(
                video_id = identifier,
                total = reviews.len(),
                "fetched YouTube page"
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        reviews.truncate(count);
        Ok(SourceResult::success(Platform::YouTube, identifier, reviews))
    }
}

fn not_found(video_id: &str) -> SourceError {
    SourceError::NotFound(format!("Video '{video_id}' not found on YouTube"))
}

fn to_review(thread: CommentThread) -> NormalizedReview {
    let snippet = thread.snippet.top_level_comment.snippet;
    NormalizedReview {
        id: thread.id,
        user: snippet
            .author_display_name
            .unwrap_or_else(|| "Anonymous".to_string()),
        rating: None,
        comment: snippet.text_display,
        date: date_prefix(&snippet.published_at),
        platform: Platform::YouTube,
        likes: snippet.like_count,
    }
}

/// Maps a Data API error response to a user-facing error by its `reason`.
async fn api_error(response: Response, video_id: &str) -> SourceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
    let Some(error) = envelope.error else {
        return SourceError::Api(format!("YouTube API returned HTTP {status}"));
    };

    let has_reason = |reason: &str| error.errors.iter().any(|e| e.reason == reason);
    if has_reason("commentsDisabled") {
        SourceError::Api("Comments are disabled for this video".to_string())
    } else if has_reason("quotaExceeded") {
        SourceError::RateLimited("YouTube API quota exceeded. Try again tomorrow.".to_string())
    } else if has_reason("videoNotFound") {
        not_found(video_id)
    } else {
        SourceError::Api(format!("YouTube API error ({status}): {}", error.message))
    }
}
