//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use perscan_core::Platform;
use perscan_sentiment::{analyze_text, NormalizedReview, SentimentLabel};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub product_id: i64,
    pub platform: String,
    pub external_id: String,
    pub user_name: String,
    pub rating: Option<f64>,
    pub comment: String,
    pub review_date: String,
    pub likes: i64,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub fetched_at: DateTime<Utc>,
}

impl ReviewRow {
    /// Rebuilds the fetched review this row was stored from.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored platform label is unknown.
    pub fn to_review(&self) -> Result<NormalizedReview, DbError> {
        let platform =
            self.platform
                .parse::<Platform>()
                .map_err(|_| DbError::InvalidColumn {
                    column: "platform",
                    value: self.platform.clone(),
                })?;
        Ok(NormalizedReview {
            id: self.external_id.clone(),
            user: self.user_name.clone(),
            rating: self.rating,
            comment: self.comment.clone(),
            date: self.review_date.clone(),
            platform,
            likes: self.likes,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Stores `reviews` for a product with their per-review sentiment, skipping any
/// whose external id is already stored for that product and platform.
///
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; no rows are kept in that case.
pub async fn insert_reviews(
    pool: &PgPool,
    product_id: i64,
    platform: Platform,
    reviews: &[NormalizedReview],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for review in reviews {
        let scores = analyze_text(&review.comment);
        let label = SentimentLabel::from_compound(scores.compound);

        let result = sqlx::query(
            "INSERT INTO reviews \
                 (product_id, platform, external_id, user_name, rating, comment, review_date, \
                  likes, sentiment_score, sentiment_label) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (product_id, platform, external_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(platform.label())
        .bind(&review.id)
        .bind(&review.user)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.date)
        .bind(review.likes)
        .bind(scores.compound)
        .bind(label.as_str())
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(
        product_id,
        platform = %platform,
        offered = reviews.len(),
        inserted,
        "stored reviews"
    );
    Ok(inserted)
}

/// Lists stored reviews for a product, most recently fetched first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(
    pool: &PgPool,
    product_id: i64,
    platform: Option<Platform>,
    limit: i64,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, product_id, platform, external_id, user_name, rating, comment, review_date, \
                likes, sentiment_score, sentiment_label, fetched_at \
         FROM reviews \
         WHERE product_id = $1 \
           AND ($2::TEXT IS NULL OR platform = $2) \
         ORDER BY fetched_at DESC, id DESC \
         LIMIT $3",
    )
    .bind(product_id)
    .bind(platform.map(Platform::label))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Reviews for one platform fetched within the last `max_age_hours`, in the
/// order they were stored. An empty result means the cache is cold.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cached_reviews(
    pool: &PgPool,
    product_id: i64,
    platform: Platform,
    max_age_hours: i64,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, product_id, platform, external_id, user_name, rating, comment, review_date, \
                likes, sentiment_score, sentiment_label, fetched_at \
         FROM reviews \
         WHERE product_id = $1 \
           AND platform = $2 \
           AND fetched_at >= NOW() - make_interval(hours => $3::INT) \
         ORDER BY id",
    )
    .bind(product_id)
    .bind(platform.label())
    .bind(i32::try_from(max_age_hours).unwrap_or(i32::MAX))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
