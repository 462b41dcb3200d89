//! Concurrent multi-platform scans.

use std::time::Duration;

use futures::future::join_all;
use perscan_core::{Platform, SourcesConfig};
use perscan_sentiment::{NormalizedReview, SentimentAnalyzer, SentimentSummary, SourceResult};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::registry::SourceRegistry;

/// Keywords shown per platform in a displayed report.
pub const PLATFORM_KEYWORD_LIMIT: usize = 10;
/// Keywords shown for the combined summary in a displayed report.
pub const COMBINED_KEYWORD_LIMIT: usize = 20;

/// One platform identifier to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRequest {
    pub platform: Platform,
    pub identifier: String,
}

impl SourceRequest {
    pub fn new(platform: Platform, identifier: impl Into<String>) -> Self {
        Self {
            platform,
            identifier: identifier.into(),
        }
    }
}

/// A platform's fetch result plus its sentiment when the fetch succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformScan {
    #[serde(flatten)]
    pub result: SourceResult,
    pub sentiment: Option<SentimentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformError {
    pub platform: Platform,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub product_name: String,
    /// In request order.
    pub platforms: Vec<PlatformScan>,
    /// Computed over the reviews of every successful platform.
    pub combined: SentimentSummary,
    pub errors: Vec<PlatformError>,
}

impl ScanReport {
    pub fn successful(&self) -> impl Iterator<Item = &PlatformScan> {
        self.platforms.iter().filter(|p| p.result.is_success())
    }

    /// Reviews returned across all successful platforms.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.successful().map(|p| p.result.reviews.len()).sum()
    }

    /// Copy with keyword lists cut to display length.
    #[must_use]
    pub fn for_display(&self) -> Self {
        let mut report = self.clone();
        for scan in &mut report.platforms {
            if let Some(sentiment) = scan.sentiment.as_mut() {
                sentiment.keywords.truncate(PLATFORM_KEYWORD_LIMIT);
            }
        }
        report.combined.keywords.truncate(COMBINED_KEYWORD_LIMIT);
        report
    }
}

/// Fans a scan out to the registered sources and aggregates the results.
#[derive(Debug, Clone)]
pub struct Scanner {
    registry: SourceRegistry,
    timeout: Duration,
    analyzer: SentimentAnalyzer,
}

impl Scanner {
    #[must_use]
    pub fn new(registry: SourceRegistry, timeout: Duration) -> Self {
        Self {
            registry,
            timeout,
            analyzer: SentimentAnalyzer::new(),
        }
    }

    /// Scanner over the production sources with the configured per-fetch timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &SourcesConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            SourceRegistry::from_config(config)?,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetch every request concurrently. Results come back in request order and
    /// a failure or timeout on one platform never affects another.
    pub async fn fetch_all(&self, requests: &[SourceRequest], count: usize) -> Vec<SourceResult> {
        join_all(requests.iter().map(|req| self.fetch_one(req, count))).await
    }

    async fn fetch_one(&self, request: &SourceRequest, count: usize) -> SourceResult {
        let platform = request.platform;
        let identifier = request.identifier.as_str();
        let Some(source) = self.registry.get(platform) else {
            return SourceResult::failure(
                platform,
                identifier,
                format!("no source registered for {platform}"),
            );
        };

        match tokio::time::timeout(self.timeout, source.fetch(identifier, count)).await {
            Ok(result) => result,
            Err(_) => {
                let error = SourceError::Timeout {
                    platform,
                    timeout: self.timeout,
                };
                tracing::warn!(
                    platform = %platform,
                    identifier,
                    error = %error,
                    "fetch timed out"
                );
                SourceResult::failure(platform, identifier, error.to_string())
            }
        }
    }

    /// Analyze already-fetched results into a report.
    ///
    /// Failed results are reported in `errors` and excluded from the combined
    /// summary, which is recomputed from the concatenated successful reviews.
    #[must_use]
    pub fn report(&self, product_name: &str, results: Vec<SourceResult>) -> ScanReport {
        let mut errors = Vec::new();
        let mut combined_reviews: Vec<NormalizedReview> = Vec::new();
        let mut platforms = Vec::with_capacity(results.len());

        for result in results {
            let sentiment = match &result.error {
                Some(error) => {
                    errors.push(PlatformError {
                        platform: result.platform,
                        error: error.clone(),
                    });
                    None
                }
                None => {
                    combined_reviews.extend(result.reviews.iter().cloned());
                    Some(self.analyzer.analyze_reviews(&result.reviews))
                }
            };
            platforms.push(PlatformScan { result, sentiment });
        }

        let combined = self.analyzer.analyze_reviews(&combined_reviews);
        tracing::info!(
            product = product_name,
            platforms = platforms.len(),
            failed = errors.len(),
            reviews = combined_reviews.len(),
            overall = %combined.overall,
            "scan complete"
        );

        ScanReport {
            product_name: product_name.to_string(),
            platforms,
            combined,
            errors,
        }
    }

    pub async fn scan(
        &self,
        product_name: &str,
        requests: &[SourceRequest],
        count: usize,
    ) -> ScanReport {
        let results = self.fetch_all(requests, count).await;
        self.report(product_name, results)
    }
}
