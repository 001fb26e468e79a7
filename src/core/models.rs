use serde::{Deserialize, Serialize};

use crate::core::words;
use crate::error::{EarwormError, Result};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Artist {
    #[serde(default)]
    pub name: String,
}

/// A saved track as handed out by the library
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl Track {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, artists: &[&str]) -> Self {
        Self {
            name: name.into(),
            artists: artists
                .iter()
                .map(|name| Artist {
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    /// Artist names joined by a single space, skipping artists without a name
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn primary_artist(&self) -> &str {
        self.artists
            .first()
            .map(|artist| artist.name.as_str())
            .unwrap_or("")
    }

    pub fn display_name(&self) -> String {
        format!("{} by {}", self.name, self.primary_artist())
    }
}

/// The words a listener remembers plus how strong a match has to be.
///
/// Construction validates the precondition the scorer relies on: at least one
/// word, and a threshold in (0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct KnownLyricsQuery {
    words: Vec<String>,
    threshold: f64,
}

impl KnownLyricsQuery {
    pub fn new(fragment: &str, threshold: f64) -> Result<Self> {
        let words: Vec<String> = words::tokenize(fragment)
            .into_iter()
            .filter(|word| !word.is_empty())
            .collect();

        Self::from_words(words, threshold)
    }

    pub fn from_words(words: Vec<String>, threshold: f64) -> Result<Self> {
        if words.is_empty() {
            return Err(EarwormError::Validation(
                "Known lyrics must contain at least one word".to_string(),
            ));
        }

        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(EarwormError::Validation(format!(
                "Likeliness threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        Ok(Self { words, threshold })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Opaque identifier of a lyric document in the lyric database
pub type DocumentId = u64;

/// One raw hit returned by a lyric database search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub document_id: DocumentId,
}

/// A lyric document whose title plausibly belongs to a track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricCandidate {
    pub document_id: DocumentId,
    pub title: String,
}

impl From<SearchHit> for LyricCandidate {
    fn from(hit: SearchHit) -> Self {
        Self {
            document_id: hit.document_id,
            title: hit.title,
        }
    }
}

/// Terminal classification of a single track scan
#[derive(Clone, Debug, PartialEq)]
pub enum ScanOutcome {
    Match { track: Track, strength: f64 },
    NoMatch,
    Failure { track: Track, cause: String },
}

impl ScanOutcome {
    #[cfg(test)]
    pub fn is_match(&self) -> bool {
        matches!(self, ScanOutcome::Match { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ScanOutcome::Failure { .. })
    }
}
