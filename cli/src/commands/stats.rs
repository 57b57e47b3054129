use anyhow::Result;
use docret_config::Config;

use super::utils::build_engine;

pub async fn handle_stats(config: &Config) -> Result<()> {
    let engine = build_engine(config).await?;
    let stats = engine.stats().await?;

    println!("documents: {}", stats.documents);
    println!("chunks:    {}", stats.chunks);
    println!(
        "index:     {} vectors, dimension {}, backend {}",
        stats.index.vectors, stats.index.dimension, stats.index.backend
    );

    Ok(())
}
