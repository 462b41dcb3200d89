use tracing::debug;

use crate::keywords::{self, Keyword, DEFAULT_TOP_N};
use crate::scorer::{round_to, LexiconScorer, PolarityScorer, PolarityScores};
use crate::types::{Breakdown, NormalizedReview, SentimentLabel, SentimentSummary};

/// Aggregates review batches into [`SentimentSummary`] values.
///
/// Generic over the scoring primitive; the default is the built-in lexicon.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer<S = LexiconScorer> {
    scorer: S,
}

impl SentimentAnalyzer<LexiconScorer> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scorer: LexiconScorer::new(),
        }
    }
}

impl<S: PolarityScorer> SentimentAnalyzer<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn analyze_text(&self, text: &str) -> PolarityScores {
        if text.trim().is_empty() {
            return PolarityScores::NEUTRAL;
        }
        self.scorer.polarity(text)
    }

    pub fn label(&self, text: &str) -> SentimentLabel {
        self.analyze_text(text).label()
    }

    /// Scores for each review in order. Reviews without text score neutral.
    pub fn score_reviews(&self, reviews: &[NormalizedReview]) -> Vec<PolarityScores> {
        reviews
            .iter()
            .map(|r| self.analyze_text(&r.comment))
            .collect()
    }

    pub fn extract_keywords<T: AsRef<str>>(&self, texts: &[T], top_n: usize) -> Vec<Keyword> {
        let scored: Vec<(&str, f64)> = texts
            .iter()
            .map(|t| (t.as_ref(), self.analyze_text(t.as_ref()).compound))
            .collect();
        keywords::extract_keywords_scored(&scored, top_n)
    }

    /// Summarize a batch of reviews.
    ///
    /// Reviews whose comment is empty or whitespace are skipped entirely, so the
    /// breakdown counts only reviews with text. A batch with nothing to score yields
    /// [`SentimentSummary::neutral`]. Keywords are always the top
    /// [`DEFAULT_TOP_N`]; callers truncate further for display.
    pub fn analyze_reviews(&self, reviews: &[NormalizedReview]) -> SentimentSummary {
        let comments: Vec<&str> = reviews.iter().map(|r| r.comment.as_str()).collect();
        self.analyze_texts(&comments)
    }

    /// Summarize a batch of raw texts, with the same rules as
    /// [`analyze_reviews`](Self::analyze_reviews).
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze_texts<T: AsRef<str>>(&self, texts: &[T]) -> SentimentSummary {
        let mut breakdown = Breakdown::default();
        let mut total = 0.0;
        let mut scored: Vec<(&str, f64)> = Vec::with_capacity(texts.len());

        for text in texts {
            let text: &str = text.as_ref();
            if text.trim().is_empty() {
                continue;
            }
            let compound = self.scorer.polarity(text).compound;
            breakdown.record(SentimentLabel::from_compound(compound));
            total += compound;
            scored.push((text, compound));
        }

        if scored.is_empty() {
            return SentimentSummary::neutral();
        }

        let mean = total / scored.len() as f64;
        debug!(
            texts = texts.len(),
            scored = scored.len(),
            average = mean,
            "analyzed review batch"
        );

        SentimentSummary {
            overall: SentimentLabel::from_compound(mean),
            breakdown,
            average_score: round_to(mean, 3),
            keywords: keywords::extract_keywords_scored(&scored, DEFAULT_TOP_N),
        }
    }
}

static DEFAULT_ANALYZER: SentimentAnalyzer = SentimentAnalyzer::new();

/// Score one text with the built-in lexicon.
#[must_use]
pub fn analyze_text(text: &str) -> PolarityScores {
    DEFAULT_ANALYZER.analyze_text(text)
}

/// Summarize reviews with the built-in lexicon.
#[must_use]
pub fn analyze_reviews(reviews: &[NormalizedReview]) -> SentimentSummary {
    DEFAULT_ANALYZER.analyze_reviews(reviews)
}
