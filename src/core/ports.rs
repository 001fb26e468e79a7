//! Seams between the scan pipeline and the external services it consumes.
//!
//! Implementations must be safe to share between concurrently running scan
//! tasks; any pooling or rate limiting is their own business.

use async_trait::async_trait;

use crate::core::models::{DocumentId, SearchHit, Track};
use crate::error::Result;

/// Full enumeration of the listener's saved tracks
#[async_trait]
pub trait SavedLibrary: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Track>>;
}

/// Free-text search over the lyric database
#[async_trait]
pub trait LyricsSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Raw lyric text of one lyric document
#[async_trait]
pub trait LyricsSource: Send + Sync {
    async fn fetch_lyrics(&self, document_id: DocumentId) -> Result<String>;
}
