//! PetFriends API test suite
//!
//! Runs declarative scenarios against the PetFriends pet-management
//! service and exposes its endpoints as one-off commands.

use std::path::PathBuf;

use clap::Parser;
use petfriends::common::config::Config;
use petfriends::common::logging;
use petfriends::{cli, commands::Commands, Result};

#[derive(Parser)]
#[command(name = "petfriends", about = "API test suite for the PetFriends service")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env();
    if let Some(url) = &cli.base_url {
        config.service.base_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    let result = match load_config(&cli) {
        Ok(config) => cli::dispatch(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
