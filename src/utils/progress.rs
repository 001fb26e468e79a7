use indicatif::{ProgressBar, ProgressStyle};

/// Centralized progress bar creation utilities
pub struct ProgressUtils;

impl ProgressUtils {
    /// Bar for saved-library paging; its length is set once the total is known
    pub fn create_library_progress() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("📚 [{elapsed_precise}] [{bar:40.yellow/cyan}] {pos}/{len} pages")
                .expect("valid library template")
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb
    }

    /// Bar for the lyric scan over all tracks
    pub fn create_scan_progress(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("valid progress template")
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Common progress bar messages
pub struct ProgressMessages;

impl ProgressMessages {
    pub const SCAN_STARTING: &'static str = "Starting to look for good songs, this might take a while - get something nice to drink, smile and recoms would pop up :D";
    pub const COMPLETED: &'static str = "✅ Completed";
}
