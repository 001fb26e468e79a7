use clap::{Parser, Subcommand};

mod cli;
mod config;
mod core;
mod error;
mod services;
mod utils;

use cli::{find, login};
use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "earworm")]
#[command(about = "Find a song that is stuck in your head by the words you remember from it")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan your saved tracks for lyrics containing the words you remember
    Find(find::FindArgs),

    /// Authorize Spotify access and cache the token
    Login(login::LoginArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Find(args) => find::execute(args, &config).await,
        Commands::Login(args) => login::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}
