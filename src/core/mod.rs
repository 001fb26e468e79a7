//! Core functionality modules
//!
//! - `models`: tracks, the known-lyrics query, candidates and scan outcomes
//! - `words` / `scoring`: word frequency indexing and match strength
//! - `resolver`, `scan_task`, `orchestrator`: the per-track pipeline and the
//!   bounded parallel scan over a whole library
//! - `ports`: traits for the external services the pipeline consumes
//! - `services`: Genius and Spotify implementations of those traits

pub mod models;
pub mod orchestrator;
pub mod ports;
pub mod report;
pub mod resolver;
pub mod scan_task;
pub mod scoring;
pub mod services;
pub mod words;

pub use models::KnownLyricsQuery;
pub use orchestrator::ParallelScanOrchestrator;
pub use scan_task::TrackScanTask;
