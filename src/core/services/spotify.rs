use async_trait::async_trait;
use indicatif::ProgressBar;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::models::{Artist, Track};
use crate::core::ports::SavedLibrary;
use crate::core::services::spotify_auth::SpotifyAuth;
use crate::core::services::status_error;
use crate::error::Result;

#[derive(Deserialize, Debug)]
struct SavedTracksPage {
    #[serde(default)]
    items: Vec<SavedItem>,
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize, Debug)]
struct SavedItem {
    #[serde(default)]
    track: Option<RawTrack>,
}

#[derive(Deserialize, Debug)]
struct RawTrack {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artists: Option<Vec<RawArtist>>,
}

#[derive(Deserialize, Debug)]
struct RawArtist {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        Track {
            name: raw.name.unwrap_or_default(),
            artists: raw
                .artists
                .unwrap_or_default()
                .into_iter()
                .map(|artist| Artist {
                    name: artist.name.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

struct Page {
    tracks: Vec<Track>,
    total: usize,
}

fn parse_page(body: &str) -> Result<Page> {
    let page: SavedTracksPage = serde_json::from_str(body)?;
    let tracks = page
        .items
        .into_iter()
        .filter_map(|item| item.track)
        .map(Track::from)
        .collect();

    Ok(Page {
        tracks,
        total: page.total,
    })
}

/// Saved-tracks enumeration against the Spotify Web API
pub struct SpotifyClient {
    client: reqwest::Client,
    api_url: String,
    page_size: usize,
    auth: Arc<SpotifyAuth>,
    progress: ProgressBar,
}

impl SpotifyClient {
    pub fn new(api_url: &str, auth: Arc<SpotifyAuth>, page_size: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
            auth,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report page progress on `progress`; its length is set once the total is known
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    async fn fetch_page(&self, offset: usize) -> Result<Page> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/me/tracks", self.api_url);
        let limit = self.page_size.to_string();
        let offset_param = offset.to_string();

        debug!("Fetching saved tracks at offset {}", offset);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.as_str()), ("offset", offset_param.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let body = response.text().await?;
        parse_page(&body)
    }
}

#[async_trait]
impl SavedLibrary for SpotifyClient {
    /// The first page is required; a later page that fails is logged and
    /// skipped so the rest of the library can still be scanned.
    async fn list_all(&self) -> Result<Vec<Track>> {
        let first = self.fetch_page(0).await?;
        let total = first.total;
        info!("Found {} total saved songs, starting to poll songs info", total);

        let pages = total.div_ceil(self.page_size).max(1);
        self.progress.set_length(pages as u64);
        self.progress.inc(1);

        let mut tracks = Vec::with_capacity(total);
        tracks.extend(first.tracks);

        for offset in (self.page_size..total).step_by(self.page_size) {
            match self.fetch_page(offset).await {
                Ok(page) => tracks.extend(page.tracks),
                Err(e) => warn!("Got an error while polling saved tracks at offset {}: {}", offset, e),
            }
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        info!("Loaded {} saved tracks", tracks.len());
        Ok(tracks)
    }
}
