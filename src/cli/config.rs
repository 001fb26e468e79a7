use clap::{Args, Subcommand};

use crate::config::Config as AppConfig;
use crate::error::Result;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

pub async fn execute(args: ConfigArgs, config: &AppConfig, config_path: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("Current configuration:");
            println!("  likeliness_threshold: {}", config.likeliness_threshold);
            match config.parallel {
                Some(parallel) => println!("  parallel: {}", parallel),
                None => println!("  parallel: auto ({})", config.effective_parallel()),
            }
            println!("  failure_backoff_seconds: {}", config.failure_backoff_seconds);
            println!("  request_timeout_seconds: {}", config.request_timeout_seconds);
            println!("  library_page_size: {}", config.library_page_size);
            println!("  genius_api_url: {}", config.genius_api_url);
            println!("  genius_web_url: {}", config.genius_web_url);
            println!("  spotify_api_url: {}", config.spotify_api_url);
            println!("  spotify_accounts_url: {}", config.spotify_accounts_url);
            println!("  token_cache_path: {}", config.token_cache_path().display());
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path(config_path)?.display());
        }
    }

    Ok(())
}
