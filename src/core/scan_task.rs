use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::models::{KnownLyricsQuery, ScanOutcome, Track};
use crate::core::ports::{LyricsSearch, LyricsSource};
use crate::core::resolver::CandidateResolver;
use crate::core::scoring;
use crate::core::words::{self, WordFrequencyMap};
use crate::error::Result;

/// Resolve, fetch, index and score the lyrics of a single track.
///
/// Cheap to clone; every scan in a run shares the same clients and query.
#[derive(Clone)]
pub struct TrackScanTask {
    search: Arc<dyn LyricsSearch>,
    source: Arc<dyn LyricsSource>,
    known: Arc<KnownLyricsQuery>,
}

impl TrackScanTask {
    pub fn new(
        search: Arc<dyn LyricsSearch>,
        source: Arc<dyn LyricsSource>,
        known: Arc<KnownLyricsQuery>,
    ) -> Self {
        Self {
            search,
            source,
            known,
        }
    }

    pub fn known(&self) -> &KnownLyricsQuery {
        &self.known
    }

    /// Never fails: search and fetch errors become `ScanOutcome::Failure`
    pub async fn scan(&self, track: Track) -> ScanOutcome {
        match self.try_scan(&track).await {
            Ok(Some(strength)) if scoring::is_match(&self.known, strength) => {
                ScanOutcome::Match { track, strength }
            }
            Ok(_) => ScanOutcome::NoMatch,
            Err(e) => {
                warn!("✗ Failed to scan {}: {}", track.display_name(), e);
                ScanOutcome::Failure {
                    track,
                    cause: e.to_string(),
                }
            }
        }
    }

    /// `None` when the track has no lyric candidates at all
    async fn try_scan(&self, track: &Track) -> Result<Option<f64>> {
        let candidates = CandidateResolver::resolve(track, self.search.as_ref()).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let mut frequencies: Vec<WordFrequencyMap> = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let lyrics = self.source.fetch_lyrics(candidate.document_id).await?;
            frequencies.push(words::index(&lyrics));
        }

        let strength = scoring::score(&self.known, &frequencies);
        debug!(
            "Scored {} at {:.3} over {} documents",
            track.display_name(),
            strength,
            frequencies.len()
        );

        Ok(Some(strength))
    }
}
