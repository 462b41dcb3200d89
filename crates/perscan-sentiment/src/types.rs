use perscan_core::Platform;
use serde::{Deserialize, Serialize};

use crate::keywords::Keyword;
use crate::scorer::{round_to, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// One feedback item from any platform, in the shape every fetcher produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReview {
    /// External identifier, unique within (product, platform).
    pub id: String,
    #[serde(default = "anonymous")]
    pub user: String,
    /// Star rating when the platform has one.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Free text. May be empty.
    #[serde(default)]
    pub comment: String,
    /// `YYYY-MM-DD` when the platform provides a timestamp, else empty.
    #[serde(default)]
    pub date: String,
    pub platform: Platform,
    #[serde(default)]
    pub likes: i64,
}

impl NormalizedReview {
    /// Review with the given id and text and default values everywhere else.
    #[must_use]
    pub fn new(platform: Platform, id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: anonymous(),
            rating: None,
            comment: comment.into(),
            date: String::new(),
            platform,
            likes: 0,
        }
    }

    /// Whether the comment carries any text worth scoring.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}

/// Outcome of fetching one platform.
///
/// A result with `error` set never carries reviews. Build one with
/// [`SourceResult::failure`] so the invariant holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub platform: Platform,
    pub identifier: String,
    pub average_rating: f64,
    pub total_reviews: usize,
    pub reviews: Vec<NormalizedReview>,
    pub error: Option<String>,
}

impl SourceResult {
    /// Successful fetch. Rating and total are derived from the reviews.
    #[must_use]
    pub fn success(
        platform: Platform,
        identifier: impl Into<String>,
        reviews: Vec<NormalizedReview>,
    ) -> Self {
        Self {
            platform,
            identifier: identifier.into(),
            average_rating: average_rating(&reviews),
            total_reviews: reviews.len(),
            reviews,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(
        platform: Platform,
        identifier: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            identifier: identifier.into(),
            average_rating: 0.0,
            total_reviews: 0,
            reviews: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Replace the derived total with the platform's own count.
    #[must_use]
    pub fn with_reported_total(mut self, total: usize) -> Self {
        if self.error.is_none() {
            self.total_reviews = total;
        }
        self
    }

    /// Replace the derived rating with the platform's own aggregate.
    #[must_use]
    pub fn with_reported_rating(mut self, rating: f64) -> Self {
        if self.error.is_none() {
            self.average_rating = rating;
        }
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Mean of the per-review ratings rounded to 2 decimals; `0.0` when none are rated.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_rating(reviews: &[NormalizedReview]) -> f64 {
    let ratings: Vec<f64> = reviews.iter().filter_map(|r| r.rating).collect();
    if ratings.is_empty() {
        return 0.0;
    }
    round_to(ratings.iter().sum::<f64>() / ratings.len() as f64, 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a compound score. Both thresholds are inclusive.
    #[must_use]
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Per-label review counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl Breakdown {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Aggregate sentiment over a batch of reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub overall: SentimentLabel,
    pub breakdown: Breakdown,
    pub average_score: f64,
    pub keywords: Vec<Keyword>,
}

impl SentimentSummary {
    /// Summary of a batch with nothing to score.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            overall: SentimentLabel::Neutral,
            breakdown: Breakdown::default(),
            average_score: 0.0,
            keywords: Vec::new(),
        }
    }

    /// Copy with at most `limit` keywords, for display.
    #[must_use]
    pub fn with_keyword_limit(&self, limit: usize) -> Self {
        let mut summary = self.clone();
        summary.keywords.truncate(limit);
        summary
    }
}

impl Default for SentimentSummary {
    fn default() -> Self {
        Self::neutral()
    }
}
