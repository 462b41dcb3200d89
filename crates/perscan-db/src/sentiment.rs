//! Database operations for the `sentiment_snapshots` table.

use chrono::{DateTime, Utc};
use perscan_core::Platform;
use perscan_sentiment::{Breakdown, Keyword, SentimentLabel, SentimentSummary};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `sentiment_snapshots` table. `platform` is `None` for the
/// combined snapshot of a scan.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SentimentSnapshotRow {
    pub id: i64,
    pub product_id: i64,
    pub platform: Option<String>,
    pub overall_sentiment: String,
    pub average_score: Decimal,
    pub positive_count: i32,
    pub negative_count: i32,
    pub neutral_count: i32,
    pub total_reviews: i32,
    pub keywords: Value,
    pub created_at: DateTime<Utc>,
}

impl SentimentSnapshotRow {
    /// The summary this snapshot was taken from.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored label or keyword list no
    /// longer parses.
    pub fn to_summary(&self) -> Result<SentimentSummary, DbError> {
        let overall = self
            .overall_sentiment
            .parse::<SentimentLabel>()
            .map_err(|_| DbError::InvalidColumn {
                column: "overall_sentiment",
                value: self.overall_sentiment.clone(),
            })?;
        let keywords: Vec<Keyword> =
            serde_json::from_value(self.keywords.clone()).map_err(|e| DbError::InvalidColumn {
                column: "keywords",
                value: e.to_string(),
            })?;

        Ok(SentimentSummary {
            overall,
            breakdown: Breakdown {
                positive: count(self.positive_count),
                negative: count(self.negative_count),
                neutral: count(self.neutral_count),
            },
            average_score: self.average_score.to_f64().unwrap_or(0.0),
            keywords,
        })
    }
}

fn count(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn column_count(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Values for a new snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSentimentSnapshot {
    pub platform: Option<Platform>,
    pub overall: SentimentLabel,
    pub average_score: Decimal,
    pub positive_count: i32,
    pub negative_count: i32,
    pub neutral_count: i32,
    pub total_reviews: i32,
    pub keywords: Value,
}

impl NewSentimentSnapshot {
    /// Snapshot of `summary`; `platform = None` records the combined view.
    /// `total_reviews` is the sum of the breakdown.
    #[must_use]
    pub fn from_summary(platform: Option<Platform>, summary: &SentimentSummary) -> Self {
        Self {
            platform,
            overall: summary.overall,
            average_score: Decimal::from_f64(summary.average_score)
                .unwrap_or(Decimal::ZERO)
                .round_dp(3),
            positive_count: column_count(summary.breakdown.positive),
            negative_count: column_count(summary.breakdown.negative),
            neutral_count: column_count(summary.breakdown.neutral),
            total_reviews: column_count(summary.breakdown.total()),
            keywords: serde_json::json!(summary.keywords),
        }
    }
}

/// Which snapshots of a product a history query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFilter {
    #[default]
    All,
    /// Only combined (cross-platform) snapshots.
    Combined,
    Platform(Platform),
}

impl SnapshotFilter {
    /// Parses a query value: absent means all, `combined` selects combined
    /// snapshots, anything else must name a platform.
    ///
    /// # Errors
    ///
    /// Returns [`perscan_core::ConfigError::UnknownPlatform`] for an unknown name.
    pub fn parse(value: Option<&str>) -> Result<Self, perscan_core::ConfigError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Self::All),
            Some(v) if v.eq_ignore_ascii_case("combined") => Ok(Self::Combined),
            Some(v) => v.parse().map(Self::Platform),
        }
    }

    fn combined_only(self) -> bool {
        matches!(self, Self::Combined)
    }

    fn platform_label(self) -> Option<&'static str> {
        match self {
            Self::Platform(p) => Some(p.label()),
            Self::All | Self::Combined => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a sentiment snapshot and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sentiment_snapshot(
    pool: &PgPool,
    product_id: i64,
    snapshot: &NewSentimentSnapshot,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sentiment_snapshots \
             (product_id, platform, overall_sentiment, average_score, positive_count, \
              negative_count, neutral_count, total_reviews, keywords) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(product_id)
    .bind(snapshot.platform.map(Platform::label))
    .bind(snapshot.overall.as_str())
    .bind(snapshot.average_score)
    .bind(snapshot.positive_count)
    .bind(snapshot.negative_count)
    .bind(snapshot.neutral_count)
    .bind(snapshot.total_reviews)
    .bind(&snapshot.keywords)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Snapshots of a product taken within the last `days` days, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sentiment_history(
    pool: &PgPool,
    product_id: i64,
    filter: SnapshotFilter,
    days: i64,
) -> Result<Vec<SentimentSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SentimentSnapshotRow>(
        "SELECT id, product_id, platform, overall_sentiment, average_score, positive_count, \
                negative_count, neutral_count, total_reviews, keywords, created_at \
         FROM sentiment_snapshots \
         WHERE product_id = $1 \
           AND created_at >= NOW() - make_interval(days => $2::INT) \
           AND (NOT $3::BOOLEAN OR platform IS NULL) \
           AND ($4::TEXT IS NULL OR platform = $4) \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(product_id)
    .bind(i32::try_from(days).unwrap_or(i32::MAX))
    .bind(filter.combined_only())
    .bind(filter.platform_label())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The most recent snapshot of a product matching `filter`, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_sentiment(
    pool: &PgPool,
    product_id: i64,
    filter: SnapshotFilter,
) -> Result<Option<SentimentSnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SentimentSnapshotRow>(
        "SELECT id, product_id, platform, overall_sentiment, average_score, positive_count, \
                negative_count, neutral_count, total_reviews, keywords, created_at \
         FROM sentiment_snapshots \
         WHERE product_id = $1 \
           AND (NOT $2::BOOLEAN OR platform IS NULL) \
           AND ($3::TEXT IS NULL OR platform = $3) \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(product_id)
    .bind(filter.combined_only())
    .bind(filter.platform_label())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
