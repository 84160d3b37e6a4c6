use crate::index::types::MIN_TOKEN_LEN;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Common English words never stored in the token index
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{2,}\b").expect("word pattern is valid"));

/// Extract the distinct index tokens of a piece of archive text.
///
/// Text is lowercased first; tokens are runs of word characters at least
/// two characters long, minus stop words.
pub fn extract_tokens(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();

    WORD
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_owned)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split a normalized query into the terms that can ever hit the token index.
///
/// Terms shorter than two characters are dropped; they are never indexed.
pub fn query_terms(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|term| term.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}
