//! External services integration
//!
//! - `genius`: lyric search and lyric page retrieval
//! - `spotify`: paged enumeration of the user's saved tracks
//! - `spotify_auth`: OAuth token acquisition and caching for Spotify

use reqwest::StatusCode;

use crate::error::{EarwormError, NetworkError};

pub mod genius;
pub mod spotify;
pub mod spotify_auth;

pub use genius::GeniusClient;
pub use spotify::SpotifyClient;
pub use spotify_auth::SpotifyAuth;

pub(crate) fn status_error(status: StatusCode) -> EarwormError {
    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NetworkError::Authentication,
        StatusCode::NOT_FOUND => NetworkError::InvalidResponse {
            reason: "resource not found".to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => NetworkError::RateLimit,
        s if s.is_server_error() => NetworkError::ServiceUnavailable,
        s => NetworkError::Status(s.as_u16()),
    };
    error.into()
}
