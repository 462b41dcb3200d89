//! Integration tests for `ProductHuntSource` against a wiremock GraphQL endpoint.

use perscan_core::{Platform, SourcesConfig};
use perscan_sources::{ProductHuntSource, ReviewSource};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(base_url: &str, token: Option<&str>) -> ProductHuntSource {
    let config = SourcesConfig {
        product_hunt_api_token: token.map(str::to_string),
        ..SourcesConfig::default()
    };
    ProductHuntSource::with_base_url(&config, base_url)
        .expect("source construction should not fail")
}

#[tokio::test]
async fn posts_query_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer ph-token"))
        .and(body_partial_json(json!({
            "variables": { "slug": "notion", "first": 25 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "post": {
                "id": "42",
                "name": "Notion",
                "commentsCount": 87,
                "reviewsRating": 4.7,
                "comments": { "edges": [
                    { "node": {
                        "id": "c1",
                        "body": "Replaced three tools for us",
                        "createdAt": "2024-02-01T12:00:00Z",
                        "votesCount": 6,
                        "user": { "name": "Ada", "username": "ada" }
                    }}
                ]}
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("ph-token")).fetch("notion", 25).await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    assert_eq!(result.platform, Platform::ProductHunt);
    assert_eq!(result.reviews.len(), 1);
    assert_eq!(result.total_reviews, 87);
    assert!((result.average_rating - 4.7).abs() < f64::EPSILON);
    assert_eq!(result.reviews[0].user, "Ada");
}

#[tokio::test]
async fn comment_page_is_capped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "first": 100 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "post": { "comments": { "edges": [] } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("ph-token")).fetch("notion", 500).await;

    assert!(result.error.is_none());
    assert_eq!(result.total_reviews, 0);
}

#[tokio::test]
async fn missing_token_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = source(&server.uri(), None).fetch("notion", 10).await;

    let error = result.error.expect("missing token should be reported");
    assert!(error.starts_with("PRODUCT_HUNT_API_TOKEN not configured"), "{error}");
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("stale")).fetch("notion", 10).await;

    assert_eq!(result.error.as_deref(), Some("Invalid or expired API token"));
}

#[tokio::test]
async fn throttled_request_is_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = source(&server.uri(), Some("ph-token")).fetch("notion", 10).await;

    assert_eq!(
        result.error.as_deref(),
        Some("Rate limit exceeded. Try again later.")
    );
}
