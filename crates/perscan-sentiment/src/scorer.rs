//! VADER lexicon scorer.
//!
//! Scoring uses the complete VADER lexicon and rule set from the
//! `vader_sentiment` crate: negation, boosters, capitalization and punctuation
//! emphasis, and the contrastive "but". The compound score lies in
//! `[-1.0, 1.0]` and the positive, negative and neutral shares sum to about 1.

use serde::{Deserialize, Serialize};
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::types::SentimentLabel;

/// Compound scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Polarity of one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl PolarityScores {
    /// Scores for text with no sentiment-bearing content.
    pub const NEUTRAL: Self = Self {
        compound: 0.0,
        positive: 0.0,
        negative: 0.0,
        neutral: 1.0,
    };

    #[must_use]
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_compound(self.compound)
    }
}

impl Default for PolarityScores {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Scores a single text. Implementations must be pure and deterministic.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> PolarityScores;
}

/// The built-in English scorer backed by the VADER lexicon.
///
/// Stateless; the lexicon tables are process-wide statics loaded on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> PolarityScores {
        if text.trim().is_empty() {
            return PolarityScores::NEUTRAL;
        }

        let analyzer = SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let share = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        let (positive, negative, neutral) = (share("pos"), share("neg"), share("neu"));

        // Text without any scorable token comes back as all zeros.
        let total = positive + negative + neutral;
        if !total.is_finite() || total <= 0.0 {
            return PolarityScores::NEUTRAL;
        }

        PolarityScores {
            compound: round_to(share("compound").clamp(-1.0, 1.0), 4),
            positive: round_to(positive, 3),
            negative: round_to(negative, 3),
            neutral: round_to(neutral, 3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> PolarityScores {
        LexiconScorer.polarity(text)
    }

    fn assert_compound(text: &str, expected: f64) {
        let actual = score(text).compound;
        assert!(
            (actual - expected).abs() < 1e-3,
            "{text}: compound {actual}, expected {expected}"
        );
    }

    #[test]
    fn empty_text_is_exactly_neutral() {
        assert_eq!(score(""), PolarityScores::NEUTRAL);
        assert_eq!(score("   \n\t"), PolarityScores::NEUTRAL);
    }

    #[test]
    fn unknown_words_are_neutral() {
        let s = score("the quick brown fox");
        assert_eq!(s.compound, 0.0);
        assert_eq!(s.neutral, 1.0);
        assert_eq!(s.label(), SentimentLabel::Neutral);
    }

    #[test]
    fn partition_sums_to_one() {
        for text in [
            "Great app, love it!",
            "Terrible experience",
            "It's okay I guess",
            "not bad but the sync is slow and buggy??",
            "I HATE the new update, it's so broken",
            ":) nice",
        ] {
            let s = score(text);
            let sum = s.positive + s.negative + s.neutral;
            assert!((sum - 1.0).abs() < 0.002, "{text}: partition sums to {sum}");
            assert!((-1.0..=1.0).contains(&s.compound), "{text}: {}", s.compound);
        }
    }

    #[test]
    fn known_phrases_score_as_expected() {
        assert_compound("Great app, love it!", 0.8622);
        assert_compound("Terrible experience", -0.4767);
        assert_compound("It's okay I guess", 0.2263);
    }

    #[test]
    fn everyday_review_words_carry_valence() {
        assert_compound("I trust this company", 0.5106);
        assert_compound("meh", -0.0772);
        assert!(score("what a disappointment").compound < 0.0);
        assert!(score("haha this is fun").compound > 0.0);
        assert!(score("I worry it will lose my data").compound < 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        assert!(score("good").compound > 0.0);
        assert!(score("not good").compound < 0.0);
        assert!(score("isn't good").compound < 0.0);
    }

    #[test]
    fn boosters_intensify() {
        let plain = score("good").compound;
        assert!(score("very good").compound > plain);
        assert!(score("very bad").compound < score("bad").compound);
    }

    #[test]
    fn caps_emphasis_in_mixed_case() {
        assert!(score("this is GREAT").compound > score("this is great").compound);
    }

    #[test]
    fn exclamation_adds_emphasis() {
        let plain = score("good").compound;
        let one = score("good!").compound;
        assert!(one > plain);
        assert!(score("good!!!").compound > one);
    }

    #[test]
    fn contrast_weights_clause_after_but() {
        assert!(score("the design is great but the app is terrible").compound < 0.0);
        assert!(score("the design is terrible but the app is great").compound > 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = "Absolutely amazing, best app ever";
        assert_eq!(score(text), score(text));
    }
}
