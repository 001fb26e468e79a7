use crate::core::models::KnownLyricsQuery;
use crate::core::words::WordFrequencyMap;

/// Sum of known-word occurrences across all maps, divided by the number of
/// known words. Duplicate known words are looked up and counted once each.
pub fn score(known: &KnownLyricsQuery, frequencies: &[WordFrequencyMap]) -> f64 {
    let words = known.words();

    let hits: u64 = frequencies
        .iter()
        .map(|map| {
            words
                .iter()
                .map(|word| map.get(word).copied().unwrap_or(0))
                .sum::<u64>()
        })
        .sum();

    hits as f64 / words.len() as f64
}

pub fn is_match(known: &KnownLyricsQuery, strength: f64) -> bool {
    strength >= known.threshold()
}
