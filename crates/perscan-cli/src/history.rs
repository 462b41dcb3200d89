//! Read-only sentiment history handler.

use perscan_db::{SentimentSnapshotRow, SnapshotFilter};

/// Display name for a snapshot's platform column.
fn platform_column(snapshot: &SentimentSnapshotRow) -> &str {
    snapshot.platform.as_deref().unwrap_or("combined")
}

/// Show stored sentiment snapshots for a product, newest first.
///
/// # Errors
///
/// Returns an error if the product is unknown, the platform filter does not
/// parse, or the database query fails.
pub(crate) async fn run_history(
    pool: &sqlx::PgPool,
    product: &str,
    platform: Option<&str>,
    days: i64,
) -> anyhow::Result<()> {
    let filter = SnapshotFilter::parse(platform)?;
    let row = perscan_db::get_product_by_name(pool, product)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{product}' not found"))?;

    let days = days.clamp(1, 365);
    let snapshots = perscan_db::list_sentiment_history(pool, row.id, filter, days).await?;

    if snapshots.is_empty() {
        println!(
            "no sentiment snapshots for '{product}' in the last {days} days; \
             run `scan --persist` first"
        );
        return Ok(());
    }

    println!(
        "{:<18}{:<20}{:<11}{:<9}{:<8}{:<8}{:<8}TOTAL",
        "CAPTURED", "PLATFORM", "OVERALL", "SCORE", "POS", "NEG", "NEU"
    );
    for snap in &snapshots {
        let captured = snap.created_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<18}{:<20}{:<11}{:<9}{:<8}{:<8}{:<8}{}",
            captured,
            platform_column(snap),
            snap.overall_sentiment,
            snap.average_score,
            snap.positive_count,
            snap.negative_count,
            snap.neutral_count,
            snap.total_reviews
        );
    }

    Ok(())
}
