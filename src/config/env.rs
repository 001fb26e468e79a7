use std::env;
use std::path::PathBuf;
use crate::error::{ConfigError, EarwormError, Result};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const LIKELINESS_THRESHOLD: &'static str = "EARWORM_LIKELINESS_THRESHOLD";
    pub const PARALLEL: &'static str = "EARWORM_PARALLEL";
    pub const FAILURE_BACKOFF_SECONDS: &'static str = "EARWORM_FAILURE_BACKOFF_SECONDS";
    pub const REQUEST_TIMEOUT_SECONDS: &'static str = "EARWORM_REQUEST_TIMEOUT_SECONDS";
    pub const LIBRARY_PAGE_SIZE: &'static str = "EARWORM_LIBRARY_PAGE_SIZE";
    pub const GENIUS_API_URL: &'static str = "EARWORM_GENIUS_API_URL";
    pub const GENIUS_WEB_URL: &'static str = "EARWORM_GENIUS_WEB_URL";
    pub const SPOTIFY_API_URL: &'static str = "EARWORM_SPOTIFY_API_URL";
    pub const SPOTIFY_ACCOUNTS_URL: &'static str = "EARWORM_SPOTIFY_ACCOUNTS_URL";
    pub const TOKEN_CACHE_PATH: &'static str = "EARWORM_TOKEN_CACHE_PATH";

    // Credentials, never written to the config file
    pub const SPOTIFY_CLIENT_ID: &'static str = "SPOTIFY_CLIENT_ID";
    pub const SPOTIFY_CLIENT_SECRET: &'static str = "SPOTIFY_CLIENT_SECRET";
    pub const SPOTIFY_REDIRECT_URI: &'static str = "SPOTIFY_REDIRECT_URI";
    pub const SPOTIFY_REFRESH_TOKEN: &'static str = "SPOTIFY_REFRESH_TOKEN";
    pub const GENIUS_ACCESS_TOKEN: &'static str = "GENIUS_ACCESS_TOKEN";
}

/// Environment variable parsing utilities with validation
pub struct EnvParser;

impl EnvParser {
    /// Parse environment variable as a trimmed, non-empty string
    pub fn parse_string(var_name: &str) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(EarwormError::Validation(format!(
                    "Environment variable {} contains invalid UTF-8",
                    var_name
                )))
            }
        }
    }

    pub fn parse_path(var_name: &str) -> Result<Option<PathBuf>> {
        Ok(Self::parse_string(var_name)?.map(PathBuf::from))
    }

    /// Parse environment variable as u64 with range validation
    pub fn parse_u64(var_name: &str, min: u64, max: u64) -> Result<Option<u64>> {
        if let Some(value_str) = Self::parse_string(var_name)? {
            let value = value_str.parse::<u64>().map_err(|_| {
                ConfigError::invalid_value(var_name, format!("'{}' (must be a positive integer)", value_str))
            })?;

            if value < min || value > max {
                return Err(ConfigError::invalid_value(
                    var_name,
                    format!("{} (must be between {} and {})", value, min, max),
                )
                .into());
            }

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    pub fn parse_usize(var_name: &str, min: usize, max: usize) -> Result<Option<usize>> {
        Ok(Self::parse_u64(var_name, min as u64, max as u64)?.map(|value| value as usize))
    }

    /// Parse environment variable as a float in the half-open range (min, max]
    pub fn parse_fraction(var_name: &str, min_exclusive: f64, max: f64) -> Result<Option<f64>> {
        if let Some(value_str) = Self::parse_string(var_name)? {
            let value = value_str
                .parse::<f64>()
                .map_err(|_| ConfigError::invalid_value(var_name, format!("'{}' (not a number)", value_str)))?;

            if !(value > min_exclusive && value <= max) {
                return Err(ConfigError::invalid_value(
                    var_name,
                    format!("{} (must be in ({}, {}])", value, min_exclusive, max),
                )
                .into());
            }

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}
