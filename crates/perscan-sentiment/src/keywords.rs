//! Frequency-ranked keyword extraction with per-keyword sentiment.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scorer::{round_to, LexiconScorer, PolarityScorer};
use crate::stop_words::STOP_WORDS;
use crate::types::SentimentLabel;

/// Number of keywords kept by the aggregator.
pub const DEFAULT_TOP_N: usize = 20;

const MIN_KEYWORD_COUNT: usize = 2;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("valid word regex"));

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
    /// Label of the mean compound score of the texts this word occurred in.
    pub sentiment: SentimentLabel,
    /// That mean, rounded to 3 decimals.
    pub score: f64,
}

struct Tally {
    word: String,
    scores: Vec<f64>,
}

/// Score each text with the built-in lexicon and extract its top keywords.
#[must_use]
pub fn extract_keywords<S: AsRef<str>>(texts: &[S], top_n: usize) -> Vec<Keyword> {
    let scorer = LexiconScorer;
    let scored: Vec<(&str, f64)> = texts
        .iter()
        .map(|t| (t.as_ref(), scorer.polarity(t.as_ref()).compound))
        .collect();
    extract_keywords_scored(&scored, top_n)
}

/// Extract the top keywords from texts whose compound scores are already known.
///
/// Tokens are whole words of at least three lowercase ASCII letters, minus stop
/// words. A word containing any other letter, such as "résumé", yields no token. Every occurrence records the compound of the text it appears in. Words
/// seen fewer than twice are dropped; equal counts keep first-seen order. Returns
/// at most `top_n` keywords, fewer when not enough qualify.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn extract_keywords_scored(texts: &[(&str, f64)], top_n: usize) -> Vec<Keyword> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<Tally> = Vec::new();

    for &(text, compound) in texts {
        let lowered = text.to_lowercase();
        for m in WORD_RE.find_iter(&lowered) {
            let word = m.as_str();
            if STOP_WORD_SET.contains(word) {
                continue;
            }
            if let Some(&slot) = index.get(word) {
                tallies[slot].scores.push(compound);
            } else {
                index.insert(word.to_string(), tallies.len());
                tallies.push(Tally {
                    word: word.to_string(),
                    scores: vec![compound],
                });
            }
        }
    }

    // Stable: ties stay in first-seen order.
    tallies.sort_by(|a, b| b.scores.len().cmp(&a.scores.len()));
    tallies.truncate(top_n.saturating_mul(2));

    let mut keywords: Vec<Keyword> = tallies
        .into_iter()
        .filter(|t| t.scores.len() >= MIN_KEYWORD_COUNT)
        .map(|t| {
            let mean = t.scores.iter().sum::<f64>() / t.scores.len() as f64;
            Keyword {
                count: t.scores.len(),
                sentiment: SentimentLabel::from_compound(mean),
                score: round_to(mean, 3),
                word: t.word,
            }
        })
        .collect();
    keywords.truncate(top_n);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_occurrence_words_are_dropped() {
        let texts = [
            "Excellent design",
            "Excellent support team",
            "Excellent value, terrible onboarding",
        ];
        let keywords = extract_keywords(&texts, DEFAULT_TOP_N);
        let excellent = keywords.iter().find(|k| k.word == "excellent").unwrap();
        assert_eq!(excellent.count, 3);
        assert_eq!(excellent.sentiment, SentimentLabel::Positive);
        assert!(keywords.iter().all(|k| k.word != "terrible"));
        assert!(keywords.iter().all(|k| k.count >= 2));
    }

    #[test]
    fn stop_words_never_surface() {
        let text = "the ".repeat(50);
        let texts = vec![text.clone(), text];
        assert!(extract_keywords(&texts, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn noise_words_are_stop_words() {
        let texts = ["app use get app use get", "really much still app"];
        assert!(extract_keywords(&texts, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn equal_counts_keep_first_seen_order() {
        let texts = [("beta alpha", 0.0), ("alpha beta", 0.0)];
        let keywords = extract_keywords_scored(&texts, 1);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "beta");

        let keywords = extract_keywords_scored(&texts, 5);
        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, ["beta", "alpha"]);
    }

    #[test]
    fn sorted_by_count_descending() {
        let texts = [("sync sync battery", 0.0), ("sync battery widget widget", 0.0)];
        let keywords = extract_keywords_scored(&texts, DEFAULT_TOP_N);
        let counts: Vec<(&str, usize)> =
            keywords.iter().map(|k| (k.word.as_str(), k.count)).collect();
        assert_eq!(counts, [("sync", 3), ("battery", 2), ("widget", 2)]);
    }

    #[test]
    fn no_padding_when_few_qualify() {
        let texts = [("crash crash", -0.5)];
        let keywords = extract_keywords_scored(&texts, DEFAULT_TOP_N);
        assert_eq!(keywords.len(), 1);
    }

    #[test]
    fn score_is_mean_of_text_compounds() {
        let texts = [("login works", 0.6), ("login fails", -0.2), ("login", 0.1)];
        let keywords = extract_keywords_scored(&texts, DEFAULT_TOP_N);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "login");
        assert!((keywords[0].score - 0.167).abs() < 1e-9);
        assert_eq!(keywords[0].sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn short_and_non_alphabetic_tokens_are_ignored() {
        let texts = [("ui ui 4k 4k v2 v2", 0.0)];
        assert!(extract_keywords_scored(&texts, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn accented_words_yield_no_fragments() {
        let texts = [
            ("Great résumé builder, naïve café", 0.6),
            ("My résumé looks naïve at the café", 0.1),
        ];
        assert!(extract_keywords_scored(&texts, DEFAULT_TOP_N).is_empty());

        let texts = [("résumé export", 0.2), ("export résumé", 0.4)];
        let keywords = extract_keywords_scored(&texts, DEFAULT_TOP_N);
        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, ["export"]);
    }

    #[test]
    fn counts_rank_ahead_of_first_seen_order() {
        // "off" and "words" are seen first but rank behind the repeated word.
        let texts = [("one-off words here zebra zebra", 0.0)];
        let keywords = extract_keywords_scored(&texts, 1);
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].word, "zebra");
    }
}
