use anyhow::Result;
use docret_config::Config;

use super::utils::build_engine;

pub async fn handle_list(config: &Config, owner: &str) -> Result<()> {
    let engine = build_engine(config).await?;
    let documents = engine.list_documents(owner)?;

    if documents.is_empty() {
        println!("No documents for owner '{}'.", owner);
        return Ok(());
    }

    println!("Documents for '{}':", owner);
    for document in documents {
        let status = if document.processed { "ready" } else { "pending" };
        println!("  {:>6}  {:<8} {}", document.id, status, document.title);
    }

    Ok(())
}
