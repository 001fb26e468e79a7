use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::credentials::SpotifyCredentials;
use crate::core::services::status_error;
use crate::error::{AuthError, EarwormError, Result};

pub const SCOPE: &str = "user-library-read";

/// Tokens expiring within this window are refreshed before use
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(EXPIRY_MARGIN_SECONDS) > now
    }
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_cached(self, previous_refresh: Option<String>, now: DateTime<Utc>) -> CachedToken {
        CachedToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: now + ChronoDuration::seconds(self.expires_in),
        }
    }
}

/// Authorization-code OAuth against the Spotify accounts service, with the
/// resulting token cached on disk between runs
pub struct SpotifyAuth {
    client: reqwest::Client,
    accounts_url: String,
    credentials: SpotifyCredentials,
    cache_path: PathBuf,
    current: Mutex<Option<CachedToken>>,
}

impl SpotifyAuth {
    pub fn new(accounts_url: &str, credentials: SpotifyCredentials, cache_path: PathBuf, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            credentials,
            cache_path,
            current: Mutex::new(None),
        })
    }

    pub fn authorize_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/authorize", self.accounts_url))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.credentials.redirect_uri)
            .append_pair("scope", SCOPE);
        Ok(url)
    }

    /// A valid access token: cached, refreshed, or obtained interactively
    pub async fn access_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        let now = Utc::now();

        if current.is_none() {
            *current = load_cached_token(&self.cache_path);
        }

        if let Some(token) = current.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.access_token.clone());
            }
        }

        let refresh_token = current
            .as_ref()
            .and_then(|token| token.refresh_token.clone())
            .or_else(|| self.credentials.refresh_token.clone());

        let token = match refresh_token {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(token) => token,
                Err(e) => {
                    warn!("Refreshing the Spotify token failed ({}), authorizing again", e);
                    self.authorize_interactively().await?
                }
            },
            None => self.authorize_interactively().await?,
        };

        if let Err(e) = save_cached_token(&self.cache_path, &token) {
            warn!("Failed to cache Spotify token: {}", e);
        }

        let access_token = token.access_token.clone();
        *current = Some(token);
        Ok(access_token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<CachedToken> {
        debug!("Refreshing Spotify access token");
        let response = self
            .request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await?;
        Ok(response.into_cached(Some(refresh_token.to_string()), Utc::now()))
    }

    async fn authorize_interactively(&self) -> Result<CachedToken> {
        let url = self.authorize_url()?;
        println!("\n🔑 Authorize access to your saved tracks by opening this URL:");
        println!("  {}", url);
        println!("Then paste the URL you were redirected to:");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let redirected = lines.next_line().await?.ok_or(AuthError::MissingCode)?;
        let code = extract_code(redirected.trim())?;

        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .await?;

        info!("Spotify authorization completed");
        Ok(response.into_cached(None, Utc::now()))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        Ok(response.json().await?)
    }
}

/// The `code` query parameter of the URL Spotify redirected the browser to
pub fn extract_code(redirected: &str) -> Result<String> {
    let url = Url::parse(redirected)?;

    if let Some((_, reason)) = url.query_pairs().find(|(key, _)| key == "error") {
        return Err(AuthError::Denied {
            reason: reason.into_owned(),
        }
        .into());
    }

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, code)| code.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AuthError::MissingCode.into())
}

fn load_cached_token(path: &Path) -> Option<CachedToken> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
            None
        }
    }
}

fn save_cached_token(path: &Path, token: &CachedToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            EarwormError::from(AuthError::TokenCache {
                reason: format!("cannot create {}: {}", parent.display(), e),
            })
        })?;
    }
    fs::write(path, serde_json::to_string_pretty(token)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            refresh_token: None,
        }
    }

    #[test]
    fn test_authorize_url_carries_client_and_scope() {
        let auth = SpotifyAuth::new(
            "https://accounts.spotify.com/",
            credentials(),
            PathBuf::from("unused.json"),
            Duration::from_secs(5),
        )
        .unwrap();

        let url = auth.authorize_url().unwrap();
        assert_eq!(url.path(), "/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "client".to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("scope".to_string(), SCOPE.to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8888/callback".to_string()
        )));
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("http://localhost:8888/callback?code=abc123&state=x").unwrap(),
            "abc123"
        );
        assert!(matches!(
            extract_code("http://localhost:8888/callback?state=x"),
            Err(EarwormError::Auth(AuthError::MissingCode))
        ));
        assert!(matches!(
            extract_code("http://localhost:8888/callback?error=access_denied"),
            Err(EarwormError::Auth(AuthError::Denied { .. }))
        ));
        assert!(extract_code("not a url").is_err());
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: now + ChronoDuration::seconds(3600),
        };
        assert!(token.is_fresh(now));

        let expiring = CachedToken {
            expires_at: now + ChronoDuration::seconds(30),
            ..token
        };
        assert!(!expiring.is_fresh(now));
    }

    #[test]
    fn test_refresh_response_keeps_previous_refresh_token() {
        let now = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"new","expires_in":3600,"token_type":"Bearer"}"#).unwrap();
        let token = response.into_cached(Some("old-refresh".to_string()), now);

        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
        assert_eq!(token.expires_at, now + ChronoDuration::seconds(3600));
    }

    #[test]
    fn test_token_cache_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let token = CachedToken {
            access_token: "a".to_string(),
            refresh_token: Some("r".to_string()),
            expires_at: Utc::now(),
        };

        assert!(load_cached_token(&path).is_none());
        save_cached_token(&path, &token).unwrap();
        assert_eq!(load_cached_token(&path), Some(token));
    }

    #[tokio::test]
    async fn test_fresh_cached_token_is_used_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let token = CachedToken {
            access_token: "cached-access".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + ChronoDuration::seconds(3600),
        };
        save_cached_token(&path, &token).unwrap();

        let auth = SpotifyAuth::new("http://127.0.0.1:9", credentials(), path, Duration::from_secs(1)).unwrap();
        assert_eq!(auth.access_token().await.unwrap(), "cached-access");
    }
}
