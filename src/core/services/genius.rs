use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::core::models::{DocumentId, SearchHit};
use crate::core::ports::{LyricsSearch, LyricsSource};
use crate::core::services::status_error;
use crate::error::{EarwormError, NetworkError, Result};

const MAX_ATTEMPTS: u32 = 3;

static LYRICS_CONTAINER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-lyrics-container="true"]"#).unwrap());

#[derive(Deserialize, Debug)]
struct SearchResponse {
    response: SearchPayload,
}

#[derive(Deserialize, Debug)]
struct SearchPayload {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize, Debug)]
struct RawHit {
    #[serde(default)]
    result: RawHitResult,
}

#[derive(Deserialize, Debug, Default)]
struct RawHitResult {
    id: Option<DocumentId>,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize, Debug)]
struct SongResponse {
    response: SongPayload,
}

#[derive(Deserialize, Debug)]
struct SongPayload {
    song: Song,
}

#[derive(Deserialize, Debug)]
struct Song {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Client for the Genius API and its song pages
#[derive(Clone)]
pub struct GeniusClient {
    client: reqwest::Client,
    api_url: String,
    web_url: String,
    access_token: String,
}

impl GeniusClient {
    pub fn new(api_url: &str, web_url: &str, access_token: &str, timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("earworm v{}", version);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            web_url: web_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    /// Rate limits, 5xx and connection errors are retried with a 300ms, 600ms
    /// backoff; anything else is mapped to an error straight away.
    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)], authorized: bool) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let mut request = self.client.get(url).query(query);
            if authorized {
                request = request.bearer_auth(&self.access_token);
            }

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => status_error(response.status()),
                Err(e) => EarwormError::from(e),
            };

            if error.is_transient() && attempt < MAX_ATTEMPTS {
                let backoff = 2u64.pow(attempt - 1) * 300;
                debug!("Retrying {} in {}ms after: {}", url, backoff, error);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                continue;
            }

            return Err(error);
        }
    }

    async fn song_page_url(&self, document_id: DocumentId) -> Result<String> {
        let url = format!("{}/songs/{}", self.api_url, document_id);
        let response = self.get_with_retry(&url, &[("text_format", "plain")], true).await?;
        let song: SongResponse = response.json().await?;

        match (song.response.song.path, song.response.song.url) {
            (Some(path), _) if !path.is_empty() => Ok(format!("{}{}", self.web_url, path)),
            (_, Some(url)) if !url.is_empty() => Ok(url),
            _ => Err(NetworkError::InvalidResponse {
                reason: format!("song {} has no page", document_id),
            }
            .into()),
        }
    }
}

#[async_trait]
impl LyricsSearch for GeniusClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        debug!("Searching Genius for: {}", query);
        let url = format!("{}/search", self.api_url);
        let response = self.get_with_retry(&url, &[("q", query)], true).await?;
        let body = response.text().await?;
        parse_search_hits(&body)
    }
}

#[async_trait]
impl LyricsSource for GeniusClient {
    async fn fetch_lyrics(&self, document_id: DocumentId) -> Result<String> {
        let page_url = self.song_page_url(document_id).await?;
        debug!("Fetching lyrics page {}", page_url);
        let response = self.get_with_retry(&page_url, &[], false).await?;
        let html = response.text().await?;
        Ok(extract_lyrics(&html))
    }
}

fn parse_search_hits(body: &str) -> Result<Vec<SearchHit>> {
    let parsed: SearchResponse = serde_json::from_str(body).map_err(|e| NetworkError::InvalidResponse {
        reason: format!("unreadable search response: {}", e),
    })?;

    Ok(parsed
        .response
        .hits
        .into_iter()
        .filter_map(|hit| {
            hit.result.id.map(|document_id| SearchHit {
                title: hit.result.title,
                document_id,
            })
        })
        .collect())
}

/// Text of every lyric container on a song page, one block per paragraph.
/// Pages without containers (instrumentals, unreleased songs) give "".
pub fn extract_lyrics(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .select(&LYRICS_CONTAINER)
        .map(|container| {
            let mut text = String::new();
            push_text(container, &mut text);
            text.trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef, out: &mut String) {
    for node in element.children() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    push_text(child, out);
                }
            }
            _ => {}
        }
    }
}
