use anyhow::{anyhow, Result};
use async_trait::async_trait;
use docret_core::models::SimilarityResult;
use tokio::sync::RwLock;

use crate::{chunk_handle, IndexItem, IndexStats, VectorStore};

struct MemoryEntry {
    handle: String,
    owner_id: String,
    document_id: u64,
    chunk_id: u64,
    chunk_index: usize,
    content: String,
    embedding: Vec<f32>,
}

/// In-memory vector index. The owner filter is applied natively over all
/// entries, so no over-fetching is involved.
pub struct MemoryVectorIndex {
    entries: RwLock<Vec<MemoryEntry>>,
    dimension: usize,
}

impl MemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            dimension,
        }
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[async_trait]
impl VectorStore for MemoryVectorIndex {
    async fn add_batch(&self, items: &[IndexItem]) -> Result<Vec<String>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Validate the whole batch before touching the index.
        for item in items {
            if item.embedding.len() != self.dimension {
                return Err(anyhow!(
                    "embedding dimension {} does not match index dimension {}",
                    item.embedding.len(),
                    self.dimension
                ));
            }
        }

        let mut entries = self.entries.write().await;
        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let handle = chunk_handle(item.document_id, item.chunk_id, item.chunk_index);
            entries.push(MemoryEntry {
                handle: handle.clone(),
                owner_id: item.owner_id.clone(),
                document_id: item.document_id,
                chunk_id: item.chunk_id,
                chunk_index: item.chunk_index,
                content: item.content.clone(),
                embedding: item.embedding.clone(),
            });
            handles.push(handle);
        }
        Ok(handles)
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        owner_filter: Option<&str>,
        min_score: f32,
    ) -> Result<Vec<SimilarityResult>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(anyhow!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            ));
        }

        let mut hits: Vec<SimilarityResult> = entries
            .iter()
            .filter(|entry| owner_filter.map_or(true, |owner| entry.owner_id == owner))
            .map(|entry| {
                let distance = l2_distance(&entry.embedding, query);
                let similarity = 1.0 / (1.0 + distance);
                SimilarityResult {
                    handle: entry.handle.clone(),
                    chunk_id: entry.chunk_id,
                    document_id: entry.document_id,
                    chunk_index: entry.chunk_index,
                    content: entry.content.clone(),
                    score: similarity,
                }
            })
            .filter(|hit| hit.score >= min_score)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn delete_by_document(&self, document_id: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|entry| entry.document_id != document_id);
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let entries = self.entries.read().await;
        Ok(IndexStats {
            vectors: entries.len(),
            dimension: self.dimension,
            backend: "memory".to_string(),
        })
    }
}
