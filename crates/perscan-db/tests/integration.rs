//! Offline tests for perscan-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use perscan_core::{AppConfig, Environment, Platform, SourcesConfig};
use perscan_db::{NewSentimentSnapshot, PoolConfig, ProductIdentifiers, SnapshotFilter};
use perscan_sentiment::{analyze_reviews, NormalizedReview};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
        log_level: "info".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        cache_max_age_hours: 24,
        sources: SourcesConfig::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn analyzed_batch_becomes_snapshot() {
    let reviews = vec![
        NormalizedReview::new(Platform::GooglePlay, "1", "I love this app, it is great"),
        NormalizedReview::new(Platform::GooglePlay, "2", "Terrible, it crashes constantly"),
        NormalizedReview::new(Platform::GooglePlay, "3", ""),
    ];
    let summary = analyze_reviews(&reviews);

    let snapshot = NewSentimentSnapshot::from_summary(Some(Platform::GooglePlay), &summary);

    assert_eq!(snapshot.platform, Some(Platform::GooglePlay));
    assert_eq!(snapshot.total_reviews, 2);
    assert_eq!(
        snapshot.positive_count + snapshot.negative_count + snapshot.neutral_count,
        snapshot.total_reviews
    );
    assert!(snapshot.keywords.is_array());
}

#[test]
fn identifiers_collect_from_requests() {
    let ids: ProductIdentifiers = [(Platform::ProductHunt, "notion"), (Platform::Reddit, "")]
        .into_iter()
        .collect();

    assert_eq!(ids.product_hunt_slug.as_deref(), Some("notion"));
    assert_eq!(ids.reddit_subreddit, None);
}

#[test]
fn combined_filter_is_distinct_from_all() {
    assert_ne!(
        SnapshotFilter::parse(Some("combined")).unwrap(),
        SnapshotFilter::parse(None).unwrap()
    );
}
