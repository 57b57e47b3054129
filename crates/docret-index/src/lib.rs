//! Vector index backends for embedded document chunks.
//!
//! Two interchangeable backends implement [`VectorStore`]: a lance dataset on
//! disk and an in-memory index for tests and small corpora. Both measure L2
//! distance and map it to a similarity score with `1 / (1 + distance)`, so
//! rankings agree across backends.

pub mod memory;
pub mod vector;

pub use memory::MemoryVectorIndex;
pub use vector::LanceVectorIndex;

use anyhow::Result;
use async_trait::async_trait;
use docret_core::models::SimilarityResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One embedded chunk ready for indexing.
#[derive(Debug, Clone)]
pub struct IndexItem {
    pub owner_id: String,
    pub document_id: u64,
    pub chunk_id: u64,
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub vectors: usize,
    pub dimension: usize,
    pub backend: String,
}

/// Similarity index over embedded chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index a batch of embedded chunks. All-or-nothing: on error no item
    /// from the batch is indexed. Returns one handle per item, in input
    /// order.
    async fn add_batch(&self, items: &[IndexItem]) -> Result<Vec<String>>;

    /// Nearest-neighbour search, optionally scoped to one owner. Results
    /// are in descending score order, at most `limit` of them, all with
    /// `score >= min_score`.
    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        owner_filter: Option<&str>,
        min_score: f32,
    ) -> Result<Vec<SimilarityResult>>;

    /// Remove every vector belonging to a document. Unknown ids are a no-op.
    async fn delete_by_document(&self, document_id: u64) -> Result<()>;

    async fn stats(&self) -> Result<IndexStats>;
}

/// Deterministic handle for an indexed chunk, stable across re-indexing of
/// the same (document, chunk, position) triple.
pub fn chunk_handle(document_id: u64, chunk_id: u64, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", document_id, chunk_id, chunk_index).as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}
