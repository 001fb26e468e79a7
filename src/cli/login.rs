use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::config::credentials::Credentials;
use crate::config::Config;
use crate::error::Result;
use crate::services::SimpleServices;

#[derive(Args)]
pub struct LoginArgs {}

/// Authorize against Spotify once so later `find` runs start without a prompt
pub async fn execute(_args: LoginArgs, config: &Config) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let services = SimpleServices::new(Arc::new(config.clone()), credentials);
    let auth = services.create_spotify_auth()?;

    auth.access_token().await?;

    info!("Spotify token cached at {}", config.token_cache_path().display());
    println!("✅ Logged in to Spotify");
    Ok(())
}
