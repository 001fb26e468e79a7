use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::core::orchestrator::default_concurrency;
use crate::error::{ConfigError, EarwormError, Result};

pub mod credentials;
pub mod env;
pub mod validation;

use env::{EnvParser, EnvVars};
use validation::ConfigValidator;

pub const DEFAULT_LIKELINESS_THRESHOLD: f64 = 0.8;
pub const MAX_LIBRARY_PAGE_SIZE: usize = 50;

fn default_likeliness_threshold() -> f64 {
    DEFAULT_LIKELINESS_THRESHOLD
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_library_page_size() -> usize {
    MAX_LIBRARY_PAGE_SIZE
}

fn default_genius_api_url() -> String {
    "https://api.genius.com".to_string()
}

fn default_genius_web_url() -> String {
    "https://genius.com".to_string()
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Minimum match strength for a track to be reported
    #[serde(default = "default_likeliness_threshold")]
    pub likeliness_threshold: f64,

    /// Number of tracks scanned concurrently (hardware concurrency - 1 when unset)
    #[serde(default)]
    pub parallel: Option<usize>,

    /// Pause after a failed track scan before the worker takes the next one
    #[serde(default)]
    pub failure_backoff_seconds: u64,

    /// Timeout for every HTTP request
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Saved tracks requested per library page
    #[serde(default = "default_library_page_size")]
    pub library_page_size: usize,

    #[serde(default = "default_genius_api_url")]
    pub genius_api_url: String,

    #[serde(default = "default_genius_web_url")]
    pub genius_web_url: String,

    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    #[serde(default = "default_spotify_accounts_url")]
    pub spotify_accounts_url: String,

    /// Where the Spotify OAuth token is cached (project data dir when unset)
    #[serde(default)]
    pub token_cache_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            likeliness_threshold: DEFAULT_LIKELINESS_THRESHOLD,
            parallel: None,
            failure_backoff_seconds: 0,
            request_timeout_seconds: default_request_timeout_seconds(),
            library_page_size: MAX_LIBRARY_PAGE_SIZE,
            genius_api_url: default_genius_api_url(),
            genius_web_url: default_genius_web_url(),
            spotify_api_url: default_spotify_api_url(),
            spotify_accounts_url: default_spotify_accounts_url(),
            token_cache_path: None,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Pick up credentials and overrides from a local .env file if present
        dotenvy::dotenv().ok();

        let config_file = if let Some(path) = config_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::FileNotFound { path }.into());
            }
            path
        } else {
            Self::default_config_path()?
        };

        Self::load_with_env(&config_file)
    }

    fn load_with_env(config_file: &Path) -> Result<Self> {
        let mut config = Self::load_or_create(config_file)?;

        // Environment variables have the highest priority
        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Writes the defaults to `path` first when it does not exist yet
    fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_file(path);
        }

        let config = Self::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save(path)?;
        debug!("Wrote default configuration to {}", path.display());

        Ok(config)
    }

    /// Defaults when the file does not exist yet
    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn load_from_env(&mut self) -> Result<()> {
        if let Some(threshold) = EnvParser::parse_fraction(EnvVars::LIKELINESS_THRESHOLD, 0.0, 1.0)? {
            self.likeliness_threshold = threshold;
        }

        if let Some(parallel) = EnvParser::parse_usize(EnvVars::PARALLEL, 1, 256)? {
            self.parallel = Some(parallel);
        }

        if let Some(backoff) = EnvParser::parse_u64(EnvVars::FAILURE_BACKOFF_SECONDS, 0, 600)? {
            self.failure_backoff_seconds = backoff;
        }

        if let Some(timeout) = EnvParser::parse_u64(EnvVars::REQUEST_TIMEOUT_SECONDS, 1, 300)? {
            self.request_timeout_seconds = timeout;
        }

        if let Some(page_size) = EnvParser::parse_usize(EnvVars::LIBRARY_PAGE_SIZE, 1, MAX_LIBRARY_PAGE_SIZE)? {
            self.library_page_size = page_size;
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::GENIUS_API_URL)? {
            self.genius_api_url = url;
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::GENIUS_WEB_URL)? {
            self.genius_web_url = url;
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::SPOTIFY_API_URL)? {
            self.spotify_api_url = url;
        }

        if let Some(url) = EnvParser::parse_string(EnvVars::SPOTIFY_ACCOUNTS_URL)? {
            self.spotify_accounts_url = url;
        }

        if let Some(path) = EnvParser::parse_path(EnvVars::TOKEN_CACHE_PATH)? {
            self.token_cache_path = Some(path);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_threshold(self.likeliness_threshold)?;
        if let Some(parallel) = self.parallel {
            ConfigValidator::validate_range(parallel, 1, 256, "parallel")?;
        }
        ConfigValidator::validate_range(self.request_timeout_seconds, 1, 300, "request_timeout_seconds")?;
        ConfigValidator::validate_range(self.library_page_size, 1, MAX_LIBRARY_PAGE_SIZE, "library_page_size")?;
        ConfigValidator::validate_url(&self.genius_api_url, "Genius API")?;
        ConfigValidator::validate_url(&self.genius_web_url, "Genius web")?;
        ConfigValidator::validate_url(&self.spotify_api_url, "Spotify API")?;
        ConfigValidator::validate_url(&self.spotify_accounts_url, "Spotify accounts")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "earworm", "earworm").ok_or_else(|| {
            EarwormError::Internal(anyhow::anyhow!("Failed to determine project directories"))
        })
    }

    fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn config_path(explicit: Option<&str>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    pub fn token_cache_path(&self) -> PathBuf {
        if let Some(ref path) = self.token_cache_path {
            return path.clone();
        }

        match Self::project_dirs() {
            Ok(dirs) => dirs.data_dir().join("spotify_token.json"),
            Err(_) => {
                warn!("ProjectDirs unavailable; caching the Spotify token in the current directory");
                PathBuf::from(".spotify_token.json")
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_seconds)
    }

    pub fn effective_parallel(&self) -> usize {
        self.parallel.unwrap_or_else(default_concurrency)
    }
}
