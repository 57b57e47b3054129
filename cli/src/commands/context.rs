use anyhow::Result;
use docret_config::Config;

use super::utils::build_engine;

pub async fn handle_context(
    config: &Config,
    query: &str,
    owner: &str,
    max_chars: Option<usize>,
) -> Result<()> {
    let max_chars = max_chars.unwrap_or(config.retrieval.max_context_chars);

    let engine = build_engine(config).await?;
    let context = engine
        .retrieve_context(
            query,
            owner,
            max_chars,
            config.retrieval.top_k,
            config.retrieval.min_score,
        )
        .await?;

    if context.is_empty() {
        eprintln!("No context assembled for '{}'.", query);
    } else {
        println!("{}", context);
    }

    Ok(())
}
