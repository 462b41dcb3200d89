//! `scan` command handler.
//!
//! Fetches reviews for each platform named on the command line, prints the
//! report as a table (or JSON), and optionally records it in the database.

use std::io::Write;

use clap::Args;
use perscan_core::{Platform, SourcesConfig};
use perscan_db::{NewSentimentSnapshot, ProductIdentifiers};
use perscan_sources::{ScanReport, Scanner, SourceRequest};

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Product name that groups the stored results
    pub product: String,
    /// Google Play package name (e.g. com.spotify.music)
    #[arg(long)]
    pub google_play: Option<String>,
    /// App Store numeric app id
    #[arg(long)]
    pub ios: Option<String>,
    /// YouTube video id
    #[arg(long)]
    pub youtube: Option<String>,
    /// Product Hunt post slug
    #[arg(long)]
    pub product_hunt: Option<String>,
    /// Subreddit name or thread path
    #[arg(long)]
    pub reddit: Option<String>,
    /// Reviews to fetch per platform (defaults to PERSCAN_DEFAULT_REVIEW_COUNT)
    #[arg(long)]
    pub count: Option<usize>,
    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
    /// Store reviews and sentiment snapshots (requires DATABASE_URL)
    #[arg(long)]
    pub persist: bool,
}

impl ScanArgs {
    /// One request per non-blank identifier, in platform order.
    pub(crate) fn requests(&self) -> Vec<SourceRequest> {
        [
            (Platform::GooglePlay, &self.google_play),
            (Platform::IosAppStore, &self.ios),
            (Platform::YouTube, &self.youtube),
            (Platform::ProductHunt, &self.product_hunt),
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

    pub(crate) fn review_count(&self, config: &SourcesConfig) -> anyhow::Result<usize> {
        let count = self.count.unwrap_or(config.default_review_count);
        if count == 0 || count > config.max_review_count {
            anyhow::bail!(
                "--count must be between 1 and {}",
                config.max_review_count
            );
        }
        Ok(count)
    }
}

/// Run a scan from the command line.
///
/// # Errors
///
/// Returns an error if no identifier is given, the count is out of range, or
/// `--persist` is set and the database write fails. Per-platform fetch failures
/// are part of the report, not errors.
pub(crate) async fn run_scan(args: &ScanArgs) -> anyhow::Result<()> {
    let product = args.product.trim();
    if product.is_empty() {
        anyhow::bail!("product name must not be empty");
    }
    let requests = args.requests();
    if requests.is_empty() {
        anyhow::bail!(
            "at least one source identifier is required \
             (--google-play, --ios, --youtube, --product-hunt, --reddit)"
        );
    }

    let config = perscan_core::load_sources_config()?;
    let count = args.review_count(&config)?;
    let scanner = Scanner::from_config(&config)?;
    let report = scanner.scan(product, &requests, count).await;

    let display = report.for_display();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&display)?);
    } else {
        let mut stdout = std::io::stdout().lock();
        render_report(&display, &mut stdout)?;
    }

    if args.persist {
        let pool = crate::connect().await?;
        perscan_db::run_migrations(&pool).await?;
        let product_id = persist_report(&pool, &requests, &report).await?;
        eprintln!("stored scan for '{product}' (product id {product_id})");
    }

    Ok(())
}

/// Record the product, its reviews, and one snapshot per successful platform
/// plus a combined one.
async fn persist_report(
    pool: &sqlx::PgPool,
    requests: &[SourceRequest],
    report: &ScanReport,
) -> anyhow::Result<i64> {
    let ids: ProductIdentifiers = requests
        .iter()
        .map(|r| (r.platform, r.identifier.as_str()))
        .collect();
    let product = perscan_db::get_or_create_product(pool, &report.product_name, &ids).await?;

    let mut any_success = false;
    for scan in report.successful() {
        any_success = true;
        let platform = scan.result.platform;
        let inserted =
            perscan_db::insert_reviews(pool, product.id, platform, &scan.result.reviews).await?;
        tracing::info!(platform = %platform, inserted, "stored reviews");

        if let Some(sentiment) = &scan.sentiment {
            let snapshot = NewSentimentSnapshot::from_summary(Some(platform), sentiment);
            perscan_db::insert_sentiment_snapshot(pool, product.id, &snapshot).await?;
        }
    }

    if any_success {
        let combined = NewSentimentSnapshot::from_summary(None, &report.combined);
        perscan_db::insert_sentiment_snapshot(pool, product.id, &combined).await?;
    }

    Ok(product.id)
}

/// Write the report as a plain-text table.
pub(crate) fn render_report(report: &ScanReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "product: {}", report.product_name)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<16}{:<30}{:<9}{:<8}{:<11}SCORE",
        "PLATFORM", "IDENTIFIER", "REVIEWS", "RATING", "SENTIMENT"
    )?;
    for scan in report.successful() {
        let (label, score) = scan
            .sentiment
            .as_ref()
            .map_or(("-", 0.0), |s| (s.overall.as_str(), s.average_score));
        writeln!(
            out,
            "{:<16}{:<30}{:<9}{:<8.2}{:<11}{:.3}",
            scan.result.platform.label(),
            scan.result.identifier,
            scan.result.reviews.len(),
            scan.result.average_rating,
            label,
            score
        )?;
    }

    if !report.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "errors:")?;
        for error in &report.errors {
            writeln!(out, "  {}: {}", error.platform.label(), error.error)?;
        }
    }

    let combined = &report.combined;
    writeln!(out)?;
    writeln!(
        out,
        "combined: {} ({:.3}) across {} reviews (+{} / -{} / ={})",
        combined.overall.as_str(),
        combined.average_score,
        report.review_count(),
        combined.breakdown.positive,
        combined.breakdown.negative,
        combined.breakdown.neutral
    )?;
    if !combined.keywords.is_empty() {
        let words: Vec<String> = combined
            .keywords
            .iter()
            .map(|k| format!("{} ({})", k.word, k.count))
            .collect();
        writeln!(out, "keywords: {}", words.join(", "))?;
    }
    Ok(())
}
