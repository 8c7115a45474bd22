mod cli;
mod commands;
mod config;
mod encoding;
mod error;
mod mcp;
mod pdf;
mod session;
mod source;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use crate::pdf::EngineOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so env-backed arguments can see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // stdout belongs to the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let client = Client::builder()
        .user_agent(concat!("quotemerge/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Mcp { settings } => {
            mcp::run_server(settings, client).await?;
        }
        Commands::Merge {
            record_id,
            settings,
        } => {
            commands::merge::run(&record_id, &settings, &client).await?;
        }
        Commands::Fetch {
            record_id,
            output,
            record,
        } => {
            commands::fetch::run(&record_id, &output, &record, &client).await?;
        }
        Commands::Combine {
            first,
            second,
            output,
            no_compress,
        } => {
            let options = EngineOptions {
                compress: !no_compress,
                ..Default::default()
            };
            commands::combine::run(&first, &second, &output, options)?;
        }
    }

    Ok(())
}
