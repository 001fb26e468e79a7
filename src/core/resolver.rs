use tracing::{debug, info};

use crate::core::models::{LyricCandidate, Track};
use crate::core::ports::LyricsSearch;
use crate::error::Result;

/// Maps a library track onto lyric documents that plausibly belong to it
pub struct CandidateResolver;

impl CandidateResolver {
    pub fn search_query(track: &Track) -> String {
        format!("{} {}", track.name, track.artist_line())
    }

    /// Searches once for `"<name> <artists>"` and keeps every hit whose title
    /// contains the track name verbatim (case-sensitive), in search order.
    ///
    /// Tracks without a name or without any named artist are skipped without
    /// touching the search service.
    pub async fn resolve(track: &Track, search: &dyn LyricsSearch) -> Result<Vec<LyricCandidate>> {
        if track.name.is_empty() {
            info!("Skipping a track with no name: {:?}", track);
            return Ok(Vec::new());
        }

        if track.artist_line().is_empty() {
            info!("Skipping a track with no artist: {:?}", track);
            return Ok(Vec::new());
        }

        let query = Self::search_query(track);
        let hits = search.search(&query).await?;
        let total_hits = hits.len();

        let candidates: Vec<LyricCandidate> = hits
            .into_iter()
            .filter(|hit| hit.title.contains(&track.name))
            .map(LyricCandidate::from)
            .collect();

        debug!(
            "Resolved {} of {} hits for '{}'",
            candidates.len(),
            total_hits,
            query
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::fakes::FakeSearch;

    #[tokio::test]
    async fn test_builds_query_from_name_and_all_artists() {
        let track = Track::new("Lost Stars", &["Adam Levine", "Keira Knightley"]);
        assert_eq!(
            CandidateResolver::search_query(&track),
            "Lost Stars Adam Levine Keira Knightley"
        );

        let search = FakeSearch::default();
        CandidateResolver::resolve(&track, &search).await.unwrap();
        assert_eq!(
            *search.queries.lock().unwrap(),
            vec!["Lost Stars Adam Levine Keira Knightley".to_string()]
        );
    }

    #[tokio::test]
    async fn test_filters_by_case_sensitive_title_containment() {
        let track = Track::new("Lost Stars", &["Adam Levine"]);
        let search = FakeSearch::default()
            .with_hit("Lost Stars Adam Levine", "Lost Stars", 1)
            .with_hit("Lost Stars Adam Levine", "lost stars (cover)", 2)
            .with_hit("Lost Stars Adam Levine", "Something Else", 3)
            .with_hit("Lost Stars Adam Levine", "Lost Stars (Live)", 4);

        let candidates = CandidateResolver::resolve(&track, &search).await.unwrap();
        let ids: Vec<_> = candidates.iter().map(|c| c.document_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_skips_track_without_name() {
        let track = Track::new("", &["Someone"]);
        let search = FakeSearch::default();
        let candidates = CandidateResolver::resolve(&track, &search).await.unwrap();
        assert!(candidates.is_empty());
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_skips_track_without_artists() {
        let search = FakeSearch::default();

        let no_artists = Track::new("Song", &[]);
        assert!(CandidateResolver::resolve(&no_artists, &search).await.unwrap().is_empty());

        let unnamed_artist = Track::new("Song", &[""]);
        assert!(CandidateResolver::resolve(&unnamed_artist, &search).await.unwrap().is_empty());

        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_hits_is_not_an_error() {
        let track = Track::new("Obscure", &["Nobody"]);
        let search = FakeSearch::default();
        let candidates = CandidateResolver::resolve(&track, &search).await.unwrap();
        assert!(candidates.is_empty());
        assert_eq!(search.call_count(), 1);
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        let track = Track::new("Song", &["Band"]);
        let search = FakeSearch::default().failing_on("Song Band");
        assert!(CandidateResolver::resolve(&track, &search).await.is_err());
    }
}
