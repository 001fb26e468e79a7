use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::core::models::{ScanOutcome, Track};
use crate::core::scan_task::TrackScanTask;
use crate::error::{EarwormError, Result};

/// One less than the available hardware concurrency, never below one
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Runs one `TrackScanTask` per track with at most `concurrency` scans in
/// flight. Every submitted track yields exactly one outcome.
pub struct ParallelScanOrchestrator {
    task: TrackScanTask,
    concurrency: usize,
    failure_backoff: Duration,
}

impl ParallelScanOrchestrator {
    pub fn new(task: TrackScanTask, concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(EarwormError::Validation(
                "Parallel scan count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            task,
            concurrency,
            failure_backoff: Duration::ZERO,
        })
    }

    /// Pause a worker for `backoff` after it produced a failure, before its
    /// permit goes back to the pool
    pub fn with_failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    #[cfg(test)]
    pub async fn run(&self, tracks: Vec<Track>) -> Vec<ScanOutcome> {
        self.run_with_progress(tracks, &ProgressBar::hidden()).await
    }

    /// Outcomes come back in submission order, whatever order the scans
    /// finished in.
    pub async fn run_with_progress(&self, tracks: Vec<Track>, progress: &ProgressBar) -> Vec<ScanOutcome> {
        let total = tracks.len();
        info!(
            "Scanning {} tracks with {} parallel workers (threshold {})",
            total,
            self.concurrency,
            self.task.known().threshold()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pending = FuturesUnordered::new();

        for (index, track) in tracks.into_iter().enumerate() {
            let task = self.task.clone();
            let semaphore = semaphore.clone();
            let backoff = self.failure_backoff;
            let submitted = track.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ScanOutcome::Failure {
                            track,
                            cause: "Worker pool closed before the scan started".to_string(),
                        };
                    }
                };

                let outcome = task.scan(track).await;
                if outcome.is_failure() && !backoff.is_zero() {
                    debug!("Backing off for {:?} after a failed scan", backoff);
                    tokio::time::sleep(backoff).await;
                }
                outcome
            });

            pending.push(async move { (index, submitted, handle.await) });
        }

        let mut outcomes: Vec<Option<ScanOutcome>> = vec![None; total];
        let mut matches = 0usize;

        while let Some((index, track, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("✗ Scan task for {} aborted: {}", track.display_name(), e);
                    ScanOutcome::Failure {
                        track,
                        cause: format!("Scan task aborted: {}", e),
                    }
                }
            };

            if let ScanOutcome::Match { track, strength } = &outcome {
                matches += 1;
                info!(
                    "Found a song that might be it! - {} (strength {:.2})",
                    track.display_name(),
                    strength
                );
            }

            progress.inc(1);
            progress.set_message(format!("{} possible matches", matches));
            outcomes[index] = Some(outcome);
        }

        outcomes.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::KnownLyricsQuery;
    use crate::core::ports::fakes::{FakeSearch, FakeSource};
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    fn library(count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| Track::new(format!("Song {}", i), &["Band"]))
            .collect()
    }

    fn fakes_for(tracks: &[Track]) -> (FakeSearch, FakeSource) {
        let mut search = FakeSearch::default();
        let mut source = FakeSource::default();
        for (i, track) in tracks.iter().enumerate() {
            let id = i as u64;
            search = search.with_hit(&format!("{} Band", track.name), &track.name, id);
            let text = if i % 2 == 0 { "hum along hum" } else { "nothing here" };
            source = source.with_lyrics(id, text);
        }
        (search, source)
    }

    fn orchestrator(search: FakeSearch, source: FakeSource, concurrency: usize) -> (ParallelScanOrchestrator, Arc<FakeSearch>) {
        let search = Arc::new(search);
        let task = TrackScanTask::new(
            search.clone(),
            Arc::new(source),
            Arc::new(KnownLyricsQuery::new("hum", 1.0).unwrap()),
        );
        (ParallelScanOrchestrator::new(task, concurrency).unwrap(), search)
    }

    #[test]
    fn test_default_concurrency_is_at_least_one() {
        assert!(default_concurrency() >= 1);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let task = TrackScanTask::new(
            Arc::new(FakeSearch::default()),
            Arc::new(FakeSource::default()),
            Arc::new(KnownLyricsQuery::new("hum", 1.0).unwrap()),
        );
        assert!(ParallelScanOrchestrator::new(task, 0).is_err());
    }

    #[tokio::test]
    async fn test_one_outcome_per_track_for_any_concurrency() {
        let tracks = library(12);
        let mut reference: Option<Vec<ScanOutcome>> = None;

        for concurrency in [1, 2, 5, 32] {
            let (search, source) = fakes_for(&tracks);
            let (orchestrator, _) = orchestrator(search, source, concurrency);
            let outcomes = orchestrator.run(tracks.clone()).await;

            assert_eq!(outcomes.len(), tracks.len());
            assert_eq!(outcomes.iter().filter(|o| o.is_match()).count(), 6);

            match &reference {
                Some(expected) => assert_eq!(&outcomes, expected),
                None => reference = Some(outcomes),
            }
        }
    }

    #[tokio::test]
    async fn test_outcomes_follow_submission_order() {
        let tracks = library(6);
        let (search, source) = fakes_for(&tracks);
        let (orchestrator, _) = orchestrator(search, source, 3);
        let outcomes = orchestrator.run(tracks.clone()).await;

        for (i, outcome) in outcomes.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(
                    outcome,
                    &ScanOutcome::Match { track: tracks[i].clone(), strength: 2.0 }
                );
            } else {
                assert_eq!(outcome, &ScanOutcome::NoMatch);
            }
        }
    }

    #[tokio::test]
    async fn test_submission_order_survives_reverse_completion() {
        let tracks = library(6);
        let (mut search, source) = fakes_for(&tracks);
        for (i, track) in tracks.iter().enumerate() {
            let delay = Duration::from_millis(40 * (tracks.len() - i) as u64);
            search = search.with_delay_for(&format!("{} Band", track.name), delay);
        }
        let source = source.failing_on(3);
        let (orchestrator, search) = orchestrator(search, source, tracks.len());

        let outcomes = orchestrator.run(tracks.clone()).await;

        let finished: Vec<String> = tracks.iter().rev().map(|t| format!("{} Band", t.name)).collect();
        assert_eq!(search.completion_order(), finished);

        assert_eq!(outcomes.len(), tracks.len());
        for (i, outcome) in outcomes.iter().enumerate() {
            match i {
                3 => assert!(matches!(outcome, ScanOutcome::Failure { track, .. } if *track == tracks[3])),
                i if i % 2 == 0 => assert_eq!(
                    outcome,
                    &ScanOutcome::Match { track: tracks[i].clone(), strength: 2.0 }
                ),
                _ => assert_eq!(outcome, &ScanOutcome::NoMatch),
            }
        }
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_track() {
        let tracks = library(8);
        let (search, source) = fakes_for(&tracks);
        let source = source.failing_on(4);
        let (orchestrator, _) = orchestrator(search, source, 3);

        let outcomes = orchestrator.run(tracks.clone()).await;
        assert_eq!(outcomes.len(), 8);
        assert!(matches!(&outcomes[4], ScanOutcome::Failure { track, .. } if *track == tracks[4]));
        assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 1);
        assert_eq!(outcomes.iter().filter(|o| o.is_match()).count(), 3);
    }

    #[tokio::test]
    async fn test_panicking_scan_becomes_failure() {
        let tracks = library(4);
        let (search, source) = fakes_for(&tracks);
        let source = source.panicking_on(1);
        let (orchestrator, _) = orchestrator(search, source, 2);

        let outcomes = orchestrator.run(tracks.clone()).await;
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(&outcomes[1], ScanOutcome::Failure { track, .. } if *track == tracks[1]));
        assert_eq!(outcomes.iter().filter(|o| o.is_failure()).count(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_scans_stay_within_bound() {
        let tracks = library(10);
        let (search, source) = fakes_for(&tracks);
        let search = search.with_delay(Duration::from_millis(20));
        let (orchestrator, search) = orchestrator(search, source, 3);

        let outcomes = orchestrator.run(tracks).await;
        assert_eq!(outcomes.len(), 10);
        assert!(search.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(search.call_count(), 10);
    }

    #[tokio::test]
    async fn test_failure_backoff_holds_the_worker() {
        let tracks = library(2);
        let (search, source) = fakes_for(&tracks);
        let source = source.failing_on(0);
        let (orchestrator, _) = orchestrator(search, source, 1);
        let orchestrator = orchestrator.with_failure_backoff(Duration::from_millis(50));

        let started = Instant::now();
        let outcomes = orchestrator.run(tracks).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(outcomes[0].is_failure());
        assert_eq!(outcomes[1], ScanOutcome::NoMatch);
    }

    #[tokio::test]
    async fn test_empty_library_yields_no_outcomes() {
        let (orchestrator, _) = orchestrator(FakeSearch::default(), FakeSource::default(), 4);
        assert!(orchestrator.run(Vec::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_progress_counts_every_track() {
        let tracks = library(5);
        let (search, source) = fakes_for(&tracks);
        let (orchestrator, _) = orchestrator(search, source, 2);
        let progress = ProgressBar::hidden();
        progress.set_length(5);

        orchestrator.run_with_progress(tracks, &progress).await;
        assert_eq!(progress.position(), 5);
    }
}
