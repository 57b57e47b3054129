use anyhow::Result;
use docret_config::Config;

use super::utils::build_engine;

pub async fn handle_search(
    config: &Config,
    query: &str,
    owner: &str,
    top: Option<usize>,
    min_score: Option<f32>,
    json: bool,
) -> Result<()> {
    let top = top.unwrap_or(config.retrieval.top_k);
    let min_score = min_score.unwrap_or(config.retrieval.min_score);

    let engine = build_engine(config).await?;
    let hits = engine.search(query, owner, top, min_score).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No matches for '{}'.", query);
        return Ok(());
    }

    println!("Found {} matching chunks:\n", hits.len());
    for (position, hit) in hits.iter().enumerate() {
        println!(
            "{}. [doc {} chunk {}] score {:.3}",
            position + 1,
            hit.document_id,
            hit.chunk_index,
            hit.score
        );
        println!("   {}", snippet(&hit.content, 160));
    }

    Ok(())
}

/// Single-line preview of chunk content, cut at a char budget.
fn snippet(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
