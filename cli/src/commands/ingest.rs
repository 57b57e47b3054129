use anyhow::{Context, Result};
use docret_config::Config;
use std::io::Read;
use std::path::PathBuf;

use super::utils::build_engine;

pub async fn handle_ingest(
    config: &Config,
    owner: &str,
    title: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let title = title.unwrap_or_else(|| {
        file.as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    });

    let engine = build_engine(config).await?;
    let document = engine.create_document(owner, &title)?;
    let report = engine.ingest(document.id, owner, &text).await?;

    println!("Ingested document {} (\"{}\")", document.id, title);
    println!("  chunks: {}", report.chunks_created);
    if report.embedded_ok {
        println!("  embedded: yes");
    } else {
        println!(
            "  embedded: no ({} of {} chunks pending)",
            report.failed_embeddings, report.chunks_created
        );
    }

    Ok(())
}
