use crate::config::env::{EnvParser, EnvVars};
use crate::error::{ConfigError, Result};

#[derive(Clone, Debug)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
}

/// Secrets for both external services, read from the environment only
#[derive(Clone, Debug)]
pub struct Credentials {
    pub spotify: SpotifyCredentials,
    pub genius_access_token: String,
}

impl Credentials {
    /// Missing required variables are fatal; this runs before any scan work
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| EnvParser::parse_string(name).ok().flatten())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingCredential {
                var: name.to_string(),
            })
        };

        Ok(Self {
            spotify: SpotifyCredentials {
                client_id: require(EnvVars::SPOTIFY_CLIENT_ID)?,
                client_secret: require(EnvVars::SPOTIFY_CLIENT_SECRET)?,
                redirect_uri: require(EnvVars::SPOTIFY_REDIRECT_URI)?,
                refresh_token: lookup(EnvVars::SPOTIFY_REFRESH_TOKEN),
            },
            genius_access_token: require(EnvVars::GENIUS_ACCESS_TOKEN)?,
        })
    }
}
