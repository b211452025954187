//! CLI entry point.
//!
//! Loads `.env`, parses the command line, initialises logging and hands off
//! to the command handlers. Errors are printed once and mapped to an exit
//! code.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sonar_cli::{Cli, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = handlers::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
