//! Integration tests for `YouTubeSource` against a wiremock Data API.

use perscan_core::{Platform, SourcesConfig};
use perscan_sources::{ReviewSource, YouTubeSource};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(base_url: &str, api_key: Option<&str>) -> YouTubeSource {
    let config = SourcesConfig {
        youtube_api_key: api_key.map(str::to_string),
        ..SourcesConfig::default()
    };
    YouTubeSource::with_base_url(&config, base_url).expect("source construction should not fail")
}

fn thread(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "snippet": { "topLevelComment": { "snippet": {
            "authorDisplayName": "@viewer",
            "textDisplay": text,
            "publishedAt": "2024-03-15T18:30:00Z",
            "likeCount": 3
        }}}
    })
}

fn api_error(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [ { "reason": reason, "message": message } ]
        }
    })
}

async fn mount_video(server: &MockServer, items: Value) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "dQw4w9WgXcQ"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn pages_comment_threads() {
    let server = MockServer::start().await;
    mount_video(&server, json!([{ "id": "dQw4w9WgXcQ" }])).await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("pageToken", "NEXT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ thread("c3", "Classic") ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "dQw4w9WgXcQ"))
        .and(query_param("textFormat", "plainText"))
        .and(query_param("order", "time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ thread("c1", "Love this song"), thread("c2", "Still great") ],
            "nextPageToken": "NEXT"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("test-key"))
        .fetch("dQw4w9WgXcQ", 10)
        .await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.platform, Platform::YouTube);
    assert_eq!(result.total_reviews, 3);
    assert_eq!(result.average_rating, 0.0);
    assert_eq!(result.reviews[2].id, "c3");
    assert_eq!(result.reviews[0].date, "2024-03-15");
    assert!(result.reviews.iter().all(|r| r.rating.is_none()));
}

#[tokio::test]
async fn missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = source(&server.uri(), None).fetch("dQw4w9WgXcQ", 10).await;

    let error = result.error.expect("missing key should be reported");
    assert!(error.starts_with("YOUTUBE_API_KEY not configured"), "{error}");
    assert!(result.reviews.is_empty());
}

#[tokio::test]
async fn unknown_video_is_not_found() {
    let server = MockServer::start().await;
    mount_video(&server, json!([])).await;

    let result = source(&server.uri(), Some("test-key"))
        .fetch("dQw4w9WgXcQ", 10)
        .await;

    assert_eq!(
        result.error.as_deref(),
        Some("Video 'dQw4w9WgXcQ' not found on YouTube")
    );
}

#[tokio::test]
async fn disabled_comments_are_reported() {
    let server = MockServer::start().await;
    mount_video(&server, json!([{ "id": "dQw4w9WgXcQ" }])).await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(api_error(
            403,
            "commentsDisabled",
            "The video has disabled comments.",
        )))
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("test-key"))
        .fetch("dQw4w9WgXcQ", 10)
        .await;

    assert_eq!(
        result.error.as_deref(),
        Some("Comments are disabled for this video")
    );
}

#[tokio::test]
async fn exhausted_quota_is_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(api_error(
            403,
            "quotaExceeded",
            "The request cannot be completed because you have exceeded your quota.",
        )))
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("test-key"))
        .fetch("dQw4w9WgXcQ", 10)
        .await;

    assert_eq!(
        result.error.as_deref(),
        Some("YouTube API quota exceeded. Try again tomorrow.")
    );
}
