//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use perscan_core::Platform;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub google_play_id: Option<String>,
    pub ios_app_id: Option<String>,
    pub youtube_video_id: Option<String>,
    pub product_hunt_slug: Option<String>,
    pub reddit_subreddit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// The stored identifier for `platform`, if one was ever recorded.
    #[must_use]
    pub fn identifier(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::GooglePlay => self.google_play_id.as_deref(),
            Platform::IosAppStore => self.ios_app_id.as_deref(),
            Platform::YouTube => self.youtube_video_id.as_deref(),
            Platform::ProductHunt => self.product_hunt_slug.as_deref(),
            Platform::Reddit => self.reddit_subreddit.as_deref(),
        }
    }
}

/// Per-platform identifiers supplied with a scan. Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductIdentifiers {
    pub google_play_id: Option<String>,
    pub ios_app_id: Option<String>,
    pub youtube_video_id: Option<String>,
    pub product_hunt_slug: Option<String>,
    pub reddit_subreddit: Option<String>,
}

impl ProductIdentifiers {
    pub fn set(&mut self, platform: Platform, identifier: &str) {
        let value = Some(identifier.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let slot = match platform {
            Platform::GooglePlay => &mut self.google_play_id,
            Platform::IosAppStore => &mut self.ios_app_id,
            Platform::YouTube => &mut self.youtube_video_id,
            Platform::ProductHunt => &mut self.product_hunt_slug,
            Platform::Reddit => &mut self.reddit_subreddit,
        };
        *slot = value;
    }
}

impl<'a> FromIterator<(Platform, &'a str)> for ProductIdentifiers {
    fn from_iter<I: IntoIterator<Item = (Platform, &'a str)>>(iter: I) -> Self {
        let mut ids = Self::default();
        for (platform, identifier) in iter {
            ids.set(platform, identifier);
        }
        ids
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the product named `name`, creating it when absent.
///
/// For an existing product, identifiers that were previously unset are filled
/// from `ids`; identifiers already stored are never overwritten.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_product(
    pool: &PgPool,
    name: &str,
    ids: &ProductIdentifiers,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products \
             (name, google_play_id, ios_app_id, youtube_video_id, product_hunt_slug, reddit_subreddit) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (name) DO UPDATE SET \
             google_play_id    = COALESCE(products.google_play_id, EXCLUDED.google_play_id), \
             ios_app_id        = COALESCE(products.ios_app_id, EXCLUDED.ios_app_id), \
             youtube_video_id  = COALESCE(products.youtube_video_id, EXCLUDED.youtube_video_id), \
             product_hunt_slug = COALESCE(products.product_hunt_slug, EXCLUDED.product_hunt_slug), \
             reddit_subreddit  = COALESCE(products.reddit_subreddit, EXCLUDED.reddit_subreddit), \
             updated_at = CASE \
                 WHEN (products.google_play_id IS NULL AND EXCLUDED.google_play_id IS NOT NULL) \
                   OR (products.ios_app_id IS NULL AND EXCLUDED.ios_app_id IS NOT NULL) \
                   OR (products.youtube_video_id IS NULL AND EXCLUDED.youtube_video_id IS NOT NULL) \
                   OR (products.product_hunt_slug IS NULL AND EXCLUDED.product_hunt_slug IS NOT NULL) \
                   OR (products.reddit_subreddit IS NULL AND EXCLUDED.reddit_subreddit IS NOT NULL) \
                 THEN NOW() ELSE products.updated_at END \
         RETURNING id, name, google_play_id, ios_app_id, youtube_video_id, product_hunt_slug, \
                   reddit_subreddit, created_at, updated_at",
    )
    .bind(name)
    .bind(&ids.google_play_id)
    .bind(&ids.ios_app_id)
    .bind(&ids.youtube_video_id)
    .bind(&ids.product_hunt_slug)
    .bind(&ids.reddit_subreddit)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the product named `name`, or `None` if it was never scanned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_name(pool: &PgPool, name: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, google_play_id, ios_app_id, youtube_video_id, product_hunt_slug, \
                reddit_subreddit, created_at, updated_at \
         FROM products \
         WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
