use async_trait::async_trait;
use perscan_core::Platform;
use perscan_sentiment::SourceResult;

use crate::error::SourceError;

/// A platform that can be asked for the reviews of one product.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch up to `count` reviews, newest first where the platform allows it.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] for missing credentials, unknown identifiers,
    /// rejected requests, and transport or decoding failures.
    async fn fetch_reviews(
        &self,
        identifier: &str,
        count: usize,
    ) -> Result<SourceResult, SourceError>;

    /// Infallible wrapper around [`ReviewSource::fetch_reviews`]: any failure becomes
    /// an error result with no reviews.
    async fn fetch(&self, identifier: &str, count: usize) -> SourceResult {
        let platform = self.platform();
        match self.fetch_reviews(identifier, count).await {
            Ok(result) => {
                tracing::info!(
                    platform = %platform,
                    identifier,
                    reviews = result.reviews.len(),
                    "fetched reviews"
                );
                result
            }
            Err(error) => {
                tracing::warn!(platform = %platform, identifier, error = %error, "fetch failed");
                SourceResult::failure(platform, identifier, error.to_string())
            }
        }
    }
}
