//! Words the keyword extractor never reports.

/// Tokens never reported as keywords.
///
/// Common English function words plus review noise such as "app" and "get".
pub(crate) const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "this", "that", "these", "those", "i", "you", "he", "she", "it", "we",
    "they", "what", "which", "who", "whom", "whose", "where", "when", "why", "how", "all",
    "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "just", "also", "now",
    "here", "there", "then", "once", "if", "my", "your", "its", "our", "their", "app",
    "use", "using", "used", "really", "much", "get", "got", "one", "two", "first", "new",
    "even", "still", "well", "way", "many",
];
