//! `POST /api/v1/scan`: fetch, analyze, persist.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use perscan_core::{Platform, SourcesConfig};
use perscan_db::{
    get_cached_reviews, get_or_create_product, insert_reviews, insert_sentiment_snapshot,
    NewSentimentSnapshot, ProductIdentifiers, ReviewRow,
};
use perscan_sentiment::{NormalizedReview, SourceResult};
use perscan_sources::{ScanReport, SourceRequest};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Platform identifiers of one scan. Blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ScanSources {
    pub google_play_app: Option<String>,
    pub ios_app: Option<String>,
    pub youtube_video: Option<String>,
    pub product_hunt_product: Option<String>,
    pub reddit: Option<String>,
}

impl ScanSources {
    fn requests(&self) -> Vec<SourceRequest> {
        [
            (Platform::GooglePlay, &self.google_play_app),
            (Platform::IosAppStore, &self.ios_app),
            (Platform::YouTube, &self.youtube_video),
            (Platform::ProductHunt, &self.product_hunt_product),
            (Platform::Reddit, &self.reddit),
        ]
        .into_iter()
        .filter_map(|(platform, identifier)| {
            identifier
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| SourceRequest::new(platform, id))
        })
        .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ScanBody {
    pub product_name: String,
    #[serde(default)]
    pub sources: ScanSources,
    pub count: Option<i64>,
    #[serde(default)]
    pub use_cache: bool,
}

#[derive(Debug, PartialEq)]
struct ValidScan {
    product_name: String,
    requests: Vec<SourceRequest>,
    count: usize,
    use_cache: bool,
}

impl ScanBody {
    fn validate(self, limits: &SourcesConfig) -> Result<ValidScan, String> {
        let product_name = self.product_name.trim().to_string();
        if product_name.is_empty() {
            return Err("product_name must not be empty".to_string());
        }

        let max = limits.max_review_count;
        let count = match self.count {
            None => limits.default_review_count,
            Some(n) => usize::try_from(n)
                .ok()
                .filter(|n| (1..=max).contains(n))
                .ok_or_else(|| format!("count must be between 1 and {max}"))?,
        };

        let requests = self.sources.requests();
        if requests.is_empty() {
            return Err("at least one source identifier is required".to_string());
        }

        Ok(ValidScan {
            product_name,
            requests,
            count,
            use_cache: self.use_cache,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ScanResponse {
    #[serde(flatten)]
    pub report: ScanReport,
    /// `None` when the product could not be stored.
    pub product_id: Option<i64>,
    /// Platforms answered from stored reviews instead of a live fetch.
    pub cached_platforms: Vec<Platform>,
}

pub(super) async fn run_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ScanBody>, JsonRejection>,
) -> Result<Json<ApiResponse<ScanResponse>>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;
    let scan = body
        .validate(&state.config.sources)
        .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;

    let ids: ProductIdentifiers = scan
        .requests
        .iter()
        .map(|r| (r.platform, r.identifier.as_str()))
        .collect();
    let product_id = match get_or_create_product(&state.pool, &scan.product_name, &ids).await {
        Ok(product) => Some(product.id),
        Err(e) => {
            tracing::error!(
                product = %scan.product_name,
                error = %e,
                "failed to store product; scanning without cache or persistence"
            );
            None
        }
    };

    let mut slots: Vec<Option<SourceResult>> = vec![None; scan.requests.len()];
    if let (true, Some(product_id)) = (scan.use_cache, product_id) {
        for (slot, request) in slots.iter_mut().zip(&scan.requests) {
            *slot = cached_result(
                &state.pool,
                product_id,
                request,
                scan.count,
                state.config.cache_max_age_hours,
            )
            .await;
        }
    }

    let pending: Vec<SourceRequest> = scan
        .requests
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(request, _)| request.clone())
        .collect();
    let mut fetched = state
        .scanner
        .fetch_all(&pending, scan.count)
        .await
        .into_iter();

    let mut results = Vec::with_capacity(slots.len());
    let mut cached_platforms = Vec::new();
    let mut fresh_platforms = Vec::new();
    for slot in slots {
        match slot {
            Some(result) => {
                cached_platforms.push(result.platform);
                results.push(result);
            }
            None => {
                if let Some(result) = fetched.next() {
                    fresh_platforms.push(result.platform);
                    results.push(result);
                }
            }
        }
    }

    let report = state.scanner.report(&scan.product_name, results);
    if let Some(product_id) = product_id {
        persist_report(&state.pool, product_id, &report, &fresh_platforms).await;
    }

    Ok(Json(ApiResponse::new(
        req_id.0,
        ScanResponse {
            report: report.for_display(),
            product_id,
            cached_platforms,
        },
    )))
}

/// Stored reviews for `request` still inside the cache window, as a result.
async fn cached_result(
    pool: &PgPool,
    product_id: i64,
    request: &SourceRequest,
    count: usize,
    max_age_hours: i64,
) -> Option<SourceResult> {
    let rows = match get_cached_reviews(pool, product_id, request.platform, max_age_hours).await {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => return None,
        Err(e) => {
            tracing::error!(platform = %request.platform, error = %e, "cache lookup failed");
            return None;
        }
    };

    let reviews: Result<Vec<NormalizedReview>, _> =
        rows.iter().map(ReviewRow::to_review).collect();
    let mut reviews = match reviews {
        Ok(reviews) => reviews,
        Err(e) => {
            tracing::error!(platform = %request.platform, error = %e, "cached review is corrupt");
            return None;
        }
    };
    reviews.truncate(count);
    tracing::debug!(
        platform = %request.platform,
        reviews = reviews.len(),
        "serving reviews from cache"
    );
    Some(SourceResult::success(
        request.platform,
        request.identifier.as_str(),
        reviews,
    ))
}

/// Stores freshly fetched reviews and one snapshot per successful platform plus
/// the combined snapshot. Failures are logged and do not fail the scan.
async fn persist_report(pool: &PgPool, product_id: i64, report: &ScanReport, fresh: &[Platform]) {
    let mut any_success = false;
    for scan in report.successful() {
        any_success = true;
        let platform = scan.result.platform;

        if fresh.contains(&platform) {
            if let Err(e) = insert_reviews(pool, product_id, platform, &scan.result.reviews).await {
                tracing::error!(platform = %platform, error = %e, "failed to store reviews");
            }
        }

        if let Some(sentiment) = &scan.sentiment {
            let snapshot = NewSentimentSnapshot::from_summary(Some(platform), sentiment);
            if let Err(e) = insert_sentiment_snapshot(pool, product_id, &snapshot).await {
                tracing::error!(platform = %platform, error = %e, "failed to store snapshot");
            }
        }
    }

    if any_success {
        let combined = NewSentimentSnapshot::from_summary(None, &report.combined);
        if let Err(e) = insert_sentiment_snapshot(pool, product_id, &combined).await {
            tracing::error!(error = %e, "failed to store combined snapshot");
        }
    }
}
