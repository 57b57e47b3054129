use anyhow::Result;
use docret_config::Config;

use super::utils::build_engine;

pub async fn handle_delete(config: &Config, id: u64) -> Result<()> {
    let engine = build_engine(config).await?;
    engine.delete_document(id).await?;
    println!("Deleted document {}.", id);
    Ok(())
}
