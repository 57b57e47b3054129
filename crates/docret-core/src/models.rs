use serde::{Deserialize, Serialize};

/// A document registered for retrieval.
///
/// The text itself is not kept here; documents own their chunks, and chunks
/// carry the content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: u64,
    pub owner_id: String,
    pub title: String,
    /// Unix seconds
    pub created_at: u64,
    /// True only when the last ingestion pass finished with zero
    /// embedding failures.
    pub processed: bool,
}

/// A chunk of document text.
///
/// This is a Data Transfer Object for the ingestion pipeline. Storage strips
/// the embedding: the vector index is the only owner of vectors, addressed
/// through `handle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u64,
    pub document_id: u64,
    /// Zero-based position within the document's chunk sequence
    pub chunk_index: usize,
    pub content: String,
    /// Content length in chars, equals `end - start`
    pub length: usize,
    /// Half-open char span `[start, end)` into the normalized source text
    pub start: usize,
    pub end: usize,
    /// Opaque vector index handle, absent until the chunk is indexed
    pub handle: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

/// A scored retrieval hit. Transient, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub handle: String,
    pub chunk_id: u64,
    pub document_id: u64,
    pub chunk_index: usize,
    pub content: String,
    /// Similarity in [0, 1], higher is more relevant
    pub score: f32,
}

/// Outcome of one ingestion pass over a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub chunks_created: usize,
    /// True only if every chunk was embedded and indexed
    pub embedded_ok: bool,
    pub failed_embeddings: usize,
}
