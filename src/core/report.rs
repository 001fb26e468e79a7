use crate::core::models::{ScanOutcome, Track};

/// Totals of one library scan, in outcome order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub total: usize,
    pub matches: Vec<(Track, f64)>,
    pub no_match: usize,
    pub failures: Vec<(Track, String)>,
}

impl ScanReport {
    pub fn from_outcomes(outcomes: &[ScanOutcome]) -> Self {
        let mut report = ScanReport {
            total: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome {
                ScanOutcome::Match { track, strength } => report.matches.push((track.clone(), *strength)),
                ScanOutcome::NoMatch => report.no_match += 1,
                ScanOutcome::Failure { track, cause } => report.failures.push((track.clone(), cause.clone())),
            }
        }

        report
    }

    pub fn print_summary(&self) {
        if self.matches.is_empty() {
            println!("\n😶 No song in your library matched those words.");
        } else {
            println!("\n🎵 Songs that might be the one:");
            for (track, strength) in &self.matches {
                println!("  • Found a song that might be it! - {} ({:.2})", track.display_name(), strength);
            }
        }

        println!("\n📊 Scan Summary:");
        println!("  🎶 Tracks scanned: {}", self.total);
        println!("  ✅ Possible matches: {}", self.matches.len());
        println!("  ➖ No match: {}", self.no_match);
        println!("  ❌ Failed: {}", self.failures.len());

        if !self.failures.is_empty() {
            println!("  Use --verbose for detailed error information.");
        }
    }
}
