//! fiksi - Browse the fiksi Q&A forum from the terminal
//!
//! Prints API responses as JSON. Cacheable reads are served from a local
//! response cache until their TTL lapses; mutations drop the entries they
//! make stale.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fiksi::cli::{execute, Cli};
use fiksi::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays valid JSON; override with RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "fiksi=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    info!(api_url = %config.api_url, cache = config.cache_enabled, "starting");

    let client = config.build_client();
    let output = execute(&cli.command, &client, &config, cli.token.as_deref()).await;

    match output.and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
