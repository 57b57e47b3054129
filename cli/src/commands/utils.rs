use anyhow::{anyhow, Context, Result};
use docret_config::{Config, ConfigBuilder, EmbeddingBackend, EmbeddingConfig, IndexBackend};
use docret_core::chunker::TextChunker;
use docret_core::embeddings::{Embedder, OllamaEmbedder, OpenAiEmbedder};
use docret_engine::RetrievalEngine;
use docret_index::{LanceVectorIndex, MemoryVectorIndex, VectorStore};
use docret_store::{ChunkStore, DocumentStore, Store};
use std::sync::Arc;
use tracing::debug;

use super::Cli;

/// Load the effective configuration: file (if given) over defaults, then
/// command-line overrides on top.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut builder = ConfigBuilder::new();
    if let Some(path) = &cli.config {
        builder = builder.with_file(path);
    }
    let mut config = builder.build()?;

    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(backend) = cli.backend {
        config.embedding.backend = backend.into();
    }

    Ok(config)
}

/// Wire up the full engine from configuration: record store, chunker,
/// embedding provider and vector index.
pub async fn build_engine(config: &Config) -> Result<RetrievalEngine> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    let store = Store::open(&config.storage.store_path())?;
    let documents = Arc::new(DocumentStore::new(&store)?);
    let chunks = Arc::new(ChunkStore::new(&store)?);

    let chunker = TextChunker::new(config.chunking.clone())?;
    let embedder = select_embedder(&config.embedding)?;
    let index = select_index(config, embedder.dimension()).await?;

    debug!(
        embedder = embedder.name(),
        dimension = embedder.dimension(),
        "engine components wired"
    );

    Ok(RetrievalEngine::new(
        documents, chunks, chunker, embedder, index,
    ))
}

fn select_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.backend {
        EmbeddingBackend::OpenAi => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY is required for the openai backend"))?;
            Ok(Arc::new(
                OpenAiEmbedder::new(config.model_name.clone(), api_key)
                    .with_batch_limit(config.batch_size),
            ))
        }
        EmbeddingBackend::Ollama => Ok(Arc::new(OllamaEmbedder::new(config.model_name.clone()))),
    }
}

async fn select_index(config: &Config, dimension: usize) -> Result<Arc<dyn VectorStore>> {
    match config.index.backend {
        IndexBackend::Lance => {
            let index = LanceVectorIndex::new(&config.storage.index_path(), dimension).await?;
            Ok(Arc::new(index))
        }
        IndexBackend::Memory => Ok(Arc::new(MemoryVectorIndex::new(dimension))),
    }
}
