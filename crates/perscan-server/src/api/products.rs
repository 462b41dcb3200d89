//! Stored reviews and sentiment history of a scanned product.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use perscan_core::Platform;
use perscan_db::{ProductRow, ReviewRow, SentimentSnapshotRow, SnapshotFilter};
use perscan_sentiment::Breakdown;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

const DEFAULT_HISTORY_DAYS: i64 = 30;
const MAX_HISTORY_DAYS: i64 = 365;

#[derive(Debug, Serialize)]
pub(super) struct ReviewItem {
    id: String,
    platform: String,
    user: String,
    rating: Option<f64>,
    comment: String,
    date: String,
    likes: i64,
    sentiment_score: f64,
    sentiment_label: String,
    fetched_at: DateTime<Utc>,
}

impl From<ReviewRow> for ReviewItem {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.external_id,
            platform: row.platform,
            user: row.user_name,
            rating: row.rating,
            comment: row.comment,
            date: row.review_date,
            likes: row.likes,
            sentiment_score: row.sentiment_score,
            sentiment_label: row.sentiment_label,
            fetched_at: row.fetched_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    id: i64,
    /// `None` for the combined snapshot.
    platform: Option<String>,
    overall: String,
    average_score: Decimal,
    breakdown: Breakdown,
    total_reviews: i32,
    keywords: Value,
    created_at: DateTime<Utc>,
}

impl From<SentimentSnapshotRow> for SnapshotItem {
    fn from(row: SentimentSnapshotRow) -> Self {
        let count = |n: i32| usize::try_from(n).unwrap_or(0);
        Self {
            id: row.id,
            platform: row.platform,
            overall: row.overall_sentiment,
            average_score: row.average_score,
            breakdown: Breakdown {
                positive: count(row.positive_count),
                negative: count(row.negative_count),
                neutral: count(row.neutral_count),
            },
            total_reviews: row.total_reviews,
            keywords: row.keywords,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReviewsQuery {
    pub platform: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub platform: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatestQuery {
    pub platform: Option<String>,
}

fn parse_platform(req_id: &str, value: Option<&str>) -> Result<Option<Platform>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e: perscan_core::ConfigError| ApiError::validation(req_id, e.to_string())),
    }
}

fn parse_filter(req_id: &str, value: Option<&str>) -> Result<SnapshotFilter, ApiError> {
    SnapshotFilter::parse(value).map_err(|e| ApiError::validation(req_id, e.to_string()))
}

fn normalize_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS)
}

async fn find_product(pool: &PgPool, req_id: &str, name: &str) -> Result<ProductRow, ApiError> {
    perscan_db::get_product_by_name(pool, name)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id, format!("product '{name}' not found")))
}

pub(super) async fn list_product_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewItem>>>, ApiError> {
    let platform = parse_platform(&req_id.0, query.platform.as_deref())?;
    let product = find_product(&state.pool, &req_id.0, &name).await?;

    let rows = perscan_db::list_reviews(
        &state.pool,
        product.id,
        platform,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ReviewItem::from).collect();
    Ok(Json(ApiResponse::new(req_id.0, data)))
}

pub(super) async fn sentiment_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    let filter = parse_filter(&req_id.0, query.platform.as_deref())?;
    let product = find_product(&state.pool, &req_id.0, &name).await?;

    let rows = perscan_db::list_sentiment_history(
        &state.pool,
        product.id,
        filter,
        normalize_days(query.days),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(SnapshotItem::from).collect();
    Ok(Json(ApiResponse::new(req_id.0, data)))
}

pub(super) async fn latest_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<ApiResponse<SnapshotItem>>, ApiError> {
    let filter = parse_filter(&req_id.0, query.platform.as_deref())?;
    let product = find_product(&state.pool, &req_id.0, &name).await?;

    let row = perscan_db::get_latest_sentiment(&state.pool, product.id, filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::not_found(req_id.0.clone(), format!("no sentiment recorded for '{name}'"))
        })?;

    Ok(Json(ApiResponse::new(req_id.0, SnapshotItem::from(row))))
}
