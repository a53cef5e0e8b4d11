//! Message analysis
//!
//! Two tokenizers with different jobs:
//! - [`analyze`] feeds the pipeline: whitespace tokens, a large stop-word
//!   list, sentiment, and category detection.
//! - [`tokenize`] feeds corpus scoring: alphanumeric-boundary tokens and a
//!   much smaller stop-word list, so trigger/keyword overlap stays loose.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::vocabulary::detect_categories;

/// Coarse message sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Result of one analyzer pass; transient, never persisted
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Filtered keywords, deduplicated, first occurrence first
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    /// Detected categories in vocabulary scan order
    pub categories: Vec<String>,
}

/// Stop words for the full analyzer pass: function words, chat fillers, and
/// polite noise. Sentiment and pattern trigger words are deliberately absent.
static ANALYZER_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Articles, pronouns, demonstratives
        "the", "a", "an", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
        "them", "my", "your", "his", "its", "our", "their", "mine", "yours", "hers", "ours",
        "theirs", "this", "that", "these", "those", "myself", "yourself", "itself", "ourselves",
        "themselves",
        // Question words
        "what", "which", "who", "whom", "whose", "where", "when", "why", "how",
        // Be/have/do and modals
        "is", "are", "am", "was", "were", "be", "been", "being", "have", "has", "had", "having",
        "do", "does", "did", "doing", "can", "could", "will", "would", "shall", "should", "may",
        "might", "must",
        // Prepositions and conjunctions
        "to", "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
        "through", "during", "before", "after", "above", "below", "from", "up", "down", "out",
        "off", "over", "under", "again", "further", "and", "but", "or", "if", "because", "as",
        "until", "while", "than",
        // Quantifiers and adverbs
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
        "not", "only", "own", "same", "so", "too", "very", "then", "once", "here", "there", "now",
        "also", "still", "yet", "even", "ever", "just", "quite", "rather", "almost",
        // Chat fillers
        "um", "uh", "hmm", "hm", "oh", "ah", "okay", "ok", "yeah", "yep", "nope", "nah", "like",
        "well", "really", "actually", "basically", "literally", "anyway", "anyways", "gonna",
        "wanna", "gotta", "lemme", "dunno",
        // Polite noise
        "please", "kindly", "maybe", "perhaps", "right", "sure", "alright",
    ]
    .into_iter()
    .collect()
});

/// Smaller stop-word list for the corpus-scoring tokenizer
static TOKENIZER_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["the", "a", "an", "is", "are", "i", "you", "we", "to", "my", "can"]
        .into_iter()
        .collect()
});

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["happy", "good", "great", "thanks", "awesome", "love", "perfect", "excellent"]
        .into_iter()
        .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["angry", "bad", "wrong", "broken", "terrible", "hate", "awful", "useless"]
        .into_iter()
        .collect()
});

/// Full analyzer pass: keywords, sentiment, categories.
///
/// Sentiment scans the filtered word sequence in message order; the last
/// matching word wins, so a later negative overrides an earlier positive.
pub fn analyze(text: &str) -> AnalysisResult {
    let lowered = text.trim().to_lowercase();

    let filtered: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| !ANALYZER_STOP_WORDS.contains(w))
        .collect();

    // Last-match-wins over the pre-dedup sequence
    let mut sentiment = Sentiment::Neutral;
    for word in &filtered {
        if POSITIVE_WORDS.contains(word) {
            sentiment = Sentiment::Positive;
        }
        if NEGATIVE_WORDS.contains(word) {
            sentiment = Sentiment::Negative;
        }
    }

    let mut seen = HashSet::new();
    let keywords: Vec<String> = filtered
        .into_iter()
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect();

    AnalysisResult {
        keywords,
        sentiment,
        categories: detect_categories(&lowered),
    }
}

/// Lightweight tokenizer for corpus scoring: lowercase, split on
/// non-alphanumeric boundaries, drop stop words, deduplicate.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.trim().to_lowercase();
    let mut seen = HashSet::new();

    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty() && !TOKENIZER_STOP_WORDS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}
