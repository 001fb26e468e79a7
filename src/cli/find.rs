use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::credentials::Credentials;
use crate::config::Config;
use crate::core::ports::{LyricsSearch, LyricsSource, SavedLibrary};
use crate::core::report::ScanReport;
use crate::core::{KnownLyricsQuery, ParallelScanOrchestrator, TrackScanTask};
use crate::error::Result;
use crate::services::SimpleServices;
use crate::utils::progress::{ProgressMessages, ProgressUtils};

#[derive(Args)]
pub struct FindArgs {
    /// Some words that you remember, can be in random order separated by a space
    #[arg(short = 'k', long, visible_alias = "known_lyrics")]
    known_lyrics: String,

    /// How strong the lyrics match has to be, in (0, 1] (config default: 0.8)
    #[arg(short = 't', long, visible_alias = "likeliness_threshold")]
    likeliness_threshold: Option<f64>,

    /// Maximum number of tracks scanned in parallel
    #[arg(short, long)]
    parallel: Option<usize>,

    /// Seconds a worker pauses after a failed track before taking the next one
    #[arg(long)]
    failure_backoff: Option<u64>,
}

pub async fn execute(args: FindArgs, config: &Config) -> Result<()> {
    let threshold = args.likeliness_threshold.unwrap_or(config.likeliness_threshold);
    let known = KnownLyricsQuery::new(&args.known_lyrics, threshold)?;
    let concurrency = args.parallel.unwrap_or_else(|| config.effective_parallel());
    let backoff = args
        .failure_backoff
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.failure_backoff());

    let credentials = Credentials::from_env()?;
    let services = SimpleServices::new(Arc::new(config.clone()), credentials);

    let library = services
        .create_spotify_client()?
        .with_progress(ProgressUtils::create_library_progress());
    let genius = Arc::new(services.create_genius_client()?);

    let report = find_song(&library, genius.clone(), genius, known, concurrency, backoff).await?;
    report.print_summary();

    Ok(())
}

/// Enumerate the whole library, then score every track against `known`
pub async fn find_song(
    library: &dyn SavedLibrary,
    search: Arc<dyn LyricsSearch>,
    source: Arc<dyn LyricsSource>,
    known: KnownLyricsQuery,
    concurrency: usize,
    failure_backoff: Duration,
) -> Result<ScanReport> {
    let task = TrackScanTask::new(search, source, Arc::new(known));
    let orchestrator = ParallelScanOrchestrator::new(task, concurrency)?.with_failure_backoff(failure_backoff);

    let tracks = library.list_all().await?;
    println!("{}", ProgressMessages::SCAN_STARTING);

    let pb = ProgressUtils::create_scan_progress(tracks.len() as u64);
    let outcomes = orchestrator.run_with_progress(tracks, &pb).await;
    pb.finish_with_message(ProgressMessages::COMPLETED);

    let report = ScanReport::from_outcomes(&outcomes);
    info!(
        "Scan finished: {} matches, {} failures out of {} tracks",
        report.matches.len(),
        report.failures.len(),
        report.total
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Track;
    use crate::core::ports::fakes::{FakeLibrary, FakeSearch, FakeSource};

    #[tokio::test]
    async fn test_find_song_over_fake_library() {
        let library = FakeLibrary {
            tracks: vec![
                Track::new("Lost Stars", &["Adam Levine"]),
                Track::new("Other", &["Band"]),
                Track::new("", &["Nameless"]),
                Track::new("Broken", &["Band"]),
            ],
        };
        let search = FakeSearch::default()
            .with_hit("Lost Stars Adam Levine", "Lost Stars", 1)
            .with_hit("Other Band", "Other", 2)
            .with_hit("Broken Band", "Broken", 3);
        let source = FakeSource::default()
            .with_lyrics(1, "lost in the stars again lost")
            .with_lyrics(2, "nothing relevant")
            .failing_on(3);

        let known = KnownLyricsQuery::new("lost stars", 0.5).unwrap();
        let report = find_song(
            &library,
            Arc::new(search),
            Arc::new(source),
            known,
            2,
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.matches, vec![(Track::new("Lost Stars", &["Adam Levine"]), 1.5)]);
        assert_eq!(report.no_match, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, Track::new("Broken", &["Band"]));
    }

    #[tokio::test]
    async fn test_find_song_rejects_zero_parallel() {
        let library = FakeLibrary { tracks: vec![] };
        let known = KnownLyricsQuery::new("words", 0.5).unwrap();
        let result = find_song(
            &library,
            Arc::new(FakeSearch::default()),
            Arc::new(FakeSource::default()),
            known,
            0,
            Duration::ZERO,
        )
        .await;
        assert!(result.is_err());
    }
}
