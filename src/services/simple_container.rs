use std::sync::Arc;

use crate::config::credentials::Credentials;
use crate::config::Config;
use crate::core::services::{GeniusClient, SpotifyAuth, SpotifyClient};
use crate::error::Result;

/// Builds the external-service clients for one run from config and credentials
pub struct SimpleServices {
    config: Arc<Config>,
    credentials: Arc<Credentials>,
}

impl SimpleServices {
    pub fn new(config: Arc<Config>, credentials: Credentials) -> Self {
        Self {
            config,
            credentials: Arc::new(credentials),
        }
    }

    pub fn create_genius_client(&self) -> Result<GeniusClient> {
        GeniusClient::new(
            &self.config.genius_api_url,
            &self.config.genius_web_url,
            &self.credentials.genius_access_token,
            self.config.request_timeout(),
        )
    }

    pub fn create_spotify_auth(&self) -> Result<SpotifyAuth> {
        SpotifyAuth::new(
            &self.config.spotify_accounts_url,
            self.credentials.spotify.clone(),
            self.config.token_cache_path(),
            self.config.request_timeout(),
        )
    }

    pub fn create_spotify_client(&self) -> Result<SpotifyClient> {
        let auth = Arc::new(self.create_spotify_auth()?);
        SpotifyClient::new(
            &self.config.spotify_api_url,
            auth,
            self.config.library_page_size,
            self.config.request_timeout(),
        )
    }
}
