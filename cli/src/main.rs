mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = commands::resolve_config(&cli)?;

    match cli.command {
        Commands::Ingest { owner, title, file } => {
            commands::handle_ingest(&config, &owner, title, file).await?;
        }
        Commands::Search {
            query,
            owner,
            top,
            min_score,
            json,
        } => {
            commands::handle_search(&config, &query, &owner, top, min_score, json).await?;
        }
        Commands::Context {
            query,
            owner,
            max_chars,
        } => {
            commands::handle_context(&config, &query, &owner, max_chars).await?;
        }
        Commands::List { owner } => {
            commands::handle_list(&config, &owner).await?;
        }
        Commands::Delete { id } => {
            commands::handle_delete(&config, id).await?;
        }
        Commands::Stats => {
            commands::handle_stats(&config).await?;
        }
    }

    Ok(())
}
