//! Word frequency indexing for lyric text.
//!
//! Text is lowercased, newlines become single spaces, and the result is split
//! on single spaces. Runs of spaces are not collapsed, so they produce
//! empty-string tokens which are counted like any other word.

use std::collections::HashMap;

/// Lowercase word token -> number of occurrences in one lyric document
pub type WordFrequencyMap = HashMap<String, u64>;

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\n', " ")
        .split(' ')
        .map(str::to_string)
        .collect()
}

pub fn index(text: &str) -> WordFrequencyMap {
    let mut frequencies = WordFrequencyMap::new();
    for word in tokenize(text) {
        *frequencies.entry(word).or_insert(0) += 1;
    }
    frequencies
}
