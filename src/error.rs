//! Error handling for the earworm application
//!
//! Errors are grouped by concern (network, configuration, authentication) and
//! folded into a single `EarwormError`. Per-track scan errors never bubble up
//! through this type to the top level: the scan task turns them into a
//! `ScanOutcome::Failure` instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EarwormError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rate limit exceeded")]
    RateLimit,

    #[error("API response invalid: {reason}")]
    InvalidResponse { reason: String },

    #[error("Authentication failed")]
    Authentication,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Unexpected HTTP status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Missing the {var} env var! please follow the README.md")]
    MissingCredential { var: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization code found in redirect URL")]
    MissingCode,

    #[error("Authorization denied: {reason}")]
    Denied { reason: String },

    #[error("Token cache error: {reason}")]
    TokenCache { reason: String },
}

pub type Result<T> = std::result::Result<T, EarwormError>;

impl From<reqwest::Error> for EarwormError {
    fn from(err: reqwest::Error) -> Self {
        EarwormError::Network(NetworkError::Http(err))
    }
}

impl From<toml::de::Error> for EarwormError {
    fn from(err: toml::de::Error) -> Self {
        EarwormError::Config(ConfigError::InvalidFormat(err))
    }
}

impl From<toml::ser::Error> for EarwormError {
    fn from(err: toml::ser::Error) -> Self {
        EarwormError::Config(ConfigError::Serialize(err))
    }
}

impl From<url::ParseError> for EarwormError {
    fn from(err: url::ParseError) -> Self {
        EarwormError::Validation(format!("Invalid URL: {}", err))
    }
}

impl ConfigError {
    pub fn invalid_value(field: &str, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

impl EarwormError {
    /// Whether a failed request is worth repeating after a short pause
    pub fn is_transient(&self) -> bool {
        match self {
            EarwormError::Network(NetworkError::RateLimit)
            | EarwormError::Network(NetworkError::ServiceUnavailable) => true,
            EarwormError::Network(NetworkError::Http(e)) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
