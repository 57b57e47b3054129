use anyhow::Result;
use docret_core::chunker::TextChunker;
use docret_core::embeddings::Embedder;
use docret_core::models::{Chunk, Document, IngestReport, SimilarityResult};
use docret_index::{IndexItem, IndexStats, VectorStore};
use docret_store::{ChunkStore, DocumentStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub documents: usize,
    pub chunks: usize,
    pub index: IndexStats,
}

/// Orchestrates chunking, embedding and indexing over injected components.
///
/// Safe for concurrent callers through `&self`. Ingestion of the same
/// document is serialized by a per-document mutex; different documents
/// proceed independently, including through embedding calls.
pub struct RetrievalEngine {
    documents: Arc<DocumentStore>,
    chunks: Arc<ChunkStore>,
    chunker: TextChunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorStore>,
    ingest_locks: StdMutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl RetrievalEngine {
    pub fn new(
        documents: Arc<DocumentStore>,
        chunks: Arc<ChunkStore>,
        chunker: TextChunker,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            documents,
            chunks,
            chunker,
            embedder,
            index,
            ingest_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn create_document(&self, owner_id: &str, title: &str) -> Result<Document> {
        let document = self.documents.create(owner_id, title)?;
        info!(document_id = document.id, owner_id, "document created");
        Ok(document)
    }

    /// Chunk, embed and index one document's text, superseding any prior
    /// pass for the same document.
    ///
    /// Embedding and index-add failures are absorbed into the report: the
    /// chunk records stay persisted and retryable, `embedded_ok` turns
    /// false. A failure while clearing prior index state aborts instead,
    /// leaving the previous pass intact.
    pub async fn ingest(
        &self,
        document_id: u64,
        owner_id: &str,
        text: &str,
    ) -> Result<IngestReport> {
        let doc_lock = self.ingest_lock(document_id);
        let _guard = doc_lock.lock().await;

        // Checked under the lock so a concurrent delete cannot leave
        // orphaned chunks behind.
        if !self.documents.contains(document_id)? {
            return Err(EngineError::DocumentNotFound(document_id).into());
        }

        self.index.delete_by_document(document_id).await?;
        let stale = self.chunks.delete_chunks_for_document(document_id)?;
        if stale > 0 {
            debug!(document_id, stale, "cleared chunks from previous pass");
        }

        let text_chunks = self.chunker.chunk(text);
        if text_chunks.is_empty() {
            self.documents.set_processed(document_id, true)?;
            info!(document_id, "ingest finished with no chunks");
            return Ok(IngestReport {
                chunks_created: 0,
                embedded_ok: true,
                failed_embeddings: 0,
            });
        }

        let chunks = self.chunks.insert_chunks(document_id, &text_chunks)?;
        let total = chunks.len();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        let report = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == total => {
                self.index_embedded_chunks(document_id, owner_id, &chunks, embeddings)
                    .await?
            }
            Ok(embeddings) => {
                warn!(
                    document_id,
                    got = embeddings.len(),
                    expected = total,
                    "embedding count mismatch, skipping indexing"
                );
                IngestReport {
                    chunks_created: total,
                    embedded_ok: false,
                    failed_embeddings: total,
                }
            }
            Err(e) => {
                warn!(document_id, error = %e, "embedding failed");
                IngestReport {
                    chunks_created: total,
                    embedded_ok: false,
                    failed_embeddings: total,
                }
            }
        };

        self.documents.set_processed(document_id, report.embedded_ok)?;
        info!(
            document_id,
            chunks = report.chunks_created,
            embedded_ok = report.embedded_ok,
            "ingest finished"
        );
        Ok(report)
    }

    async fn index_embedded_chunks(
        &self,
        document_id: u64,
        owner_id: &str,
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<IngestReport> {
        let total = chunks.len();
        let items: Vec<IndexItem> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexItem {
                owner_id: owner_id.to_string(),
                document_id,
                chunk_id: chunk.id,
                chunk_index: chunk.chunk_index,
                content: chunk.content.clone(),
                embedding,
            })
            .collect();

        match self.index.add_batch(&items).await {
            Ok(handles) => {
                for (chunk, handle) in chunks.iter().zip(handles.iter()) {
                    self.chunks.set_handle(chunk.id, handle)?;
                }
                Ok(IngestReport {
                    chunks_created: total,
                    embedded_ok: true,
                    failed_embeddings: 0,
                })
            }
            Err(e) => {
                warn!(document_id, error = %e, "indexing failed, chunks kept for retry");
                Ok(IngestReport {
                    chunks_created: total,
                    embedded_ok: false,
                    failed_embeddings: total,
                })
            }
        }
    }

    /// Raw ranked search scoped to one owner. The query is embedded once.
    pub async fn search(
        &self,
        query: &str,
        owner_id: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SimilarityResult>> {
        let query_vector = self.embedder.embed_one(query).await?;
        self.index
            .search(&query_vector, top_k, Some(owner_id), min_score)
            .await
    }

    /// Assemble a bounded context string from the owner's best-matching
    /// chunks, in ranked order.
    ///
    /// Only content chars count against `max_chars`; assembly stops before
    /// the first item that would overflow and never truncates an item.
    /// Backend failures degrade to an empty context rather than an error.
    pub async fn retrieve_context(
        &self,
        query: &str,
        owner_id: &str,
        max_chars: usize,
        top_k: usize,
        min_score: f32,
    ) -> Result<String> {
        let results = match self.search(query, owner_id, top_k, min_score).await {
            Ok(results) => results,
            Err(e) => {
                error!(owner_id, error = %e, "retrieval failed, returning empty context");
                return Ok(String::new());
            }
        };

        let mut parts: Vec<String> = Vec::new();
        let mut used = 0usize;
        for hit in results {
            let content_len = hit.content.chars().count();
            if used + content_len > max_chars {
                break;
            }
            used += content_len;
            parts.push(format!("[Doc {}]: {}", hit.document_id, hit.content));
        }

        debug!(owner_id, parts = parts.len(), chars = used, "context assembled");
        Ok(parts.join("\n\n"))
    }

    /// Remove a document, its chunk records and its index entries.
    pub async fn delete_document(&self, document_id: u64) -> Result<()> {
        let doc_lock = self.ingest_lock(document_id);
        let guard = doc_lock.lock().await;

        if !self.documents.contains(document_id)? {
            return Err(EngineError::DocumentNotFound(document_id).into());
        }

        self.index.delete_by_document(document_id).await?;
        self.chunks.delete_chunks_for_document(document_id)?;
        self.documents.delete(document_id)?;

        drop(guard);
        let mut locks = self.ingest_locks.lock().unwrap();
        locks.remove(&document_id);

        info!(document_id, "document deleted");
        Ok(())
    }

    pub fn get_document(&self, document_id: u64) -> Result<Document> {
        Ok(self
            .documents
            .get(document_id)?
            .ok_or(EngineError::DocumentNotFound(document_id))?)
    }

    pub fn list_documents(&self, owner_id: &str) -> Result<Vec<Document>> {
        self.documents.list_for_owner(owner_id)
    }

    pub fn get_chunks(&self, document_id: u64) -> Result<Vec<Chunk>> {
        if !self.documents.contains(document_id)? {
            return Err(EngineError::DocumentNotFound(document_id).into());
        }
        self.chunks.get_chunks_for_document(document_id)
    }

    pub async fn stats(&self) -> Result<EngineStats> {
        Ok(EngineStats {
            documents: self.documents.count()?,
            chunks: self.chunks.count()?,
            index: self.index.stats().await?,
        })
    }

    fn ingest_lock(&self, document_id: u64) -> Arc<Mutex<()>> {
        let mut locks = self.ingest_locks.lock().unwrap();
        locks
            .entry(document_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
