//! Sentiment scoring for product feedback.
//!
//! Scores review text with the VADER lexicon, extracts ranked keywords, and
//! aggregates a batch of [`NormalizedReview`]s into a [`SentimentSummary`]. Also
//! defines the review contract every platform fetcher produces. Nothing here does
//! I/O and nothing here fails: empty input yields the neutral result.

pub mod analyzer;
pub mod keywords;
pub mod scorer;
pub mod types;

mod stop_words;

pub use analyzer::{analyze_reviews, analyze_text, SentimentAnalyzer};
pub use keywords::{extract_keywords, extract_keywords_scored, Keyword, DEFAULT_TOP_N};
pub use scorer::{
    LexiconScorer, PolarityScorer, PolarityScores, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};
pub use types::{
    average_rating, Breakdown, NormalizedReview, SentimentLabel, SentimentSummary,
    SourceResult,
};
