use crate::storage::{Store, Tree};
use anyhow::Result;
use docret_core::chunker::TextChunk;
use docret_core::models::Chunk;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: u64,
    pub document_id: u64,
    pub chunk_index: usize,
    pub content: String,
    pub length: usize,
    pub start: usize,
    pub end: usize,
    pub handle: Option<String>,
    // Embeddings are NOT stored here, the vector index owns them
}

impl From<StoredChunk> for Chunk {
    fn from(stored: StoredChunk) -> Self {
        Chunk {
            id: stored.id,
            document_id: stored.document_id,
            chunk_index: stored.chunk_index,
            content: stored.content,
            length: stored.length,
            start: stored.start,
            end: stored.end,
            handle: stored.handle,
            embedding: None,
        }
    }
}

/// Chunk persistence keyed by numeric chunk id, with a document → chunk ids
/// secondary index.
pub struct ChunkStore {
    chunks_tree: Tree,
    doc_chunks_tree: Tree, // document_id -> Vec<chunk_id>
    next_id: AtomicU64,
}

impl ChunkStore {
    pub fn new(store: &Store) -> Result<Self> {
        let chunks_tree = store.open_tree("chunks")?;
        let doc_chunks_tree = store.open_tree("document_chunks")?;

        // Initialize next_id
        let last_id = chunks_tree
            .last()?
            .map(|(k, _)| u64::from_be_bytes(k.as_slice().try_into().unwrap()))
            .unwrap_or(0);

        Ok(Self {
            chunks_tree,
            doc_chunks_tree,
            next_id: AtomicU64::new(last_id + 1),
        })
    }

    /// Persist one document's chunks in order, assigning fresh ids.
    ///
    /// `chunk_index` is the position in `chunks`; callers pass the full
    /// chunker output so indices stay contiguous from zero.
    pub fn insert_chunks(&self, document_id: u64, chunks: &[TextChunk]) -> Result<Vec<Chunk>> {
        let mut inserted = Vec::with_capacity(chunks.len());
        let mut ids = self.chunk_ids_for_document(document_id)?;

        for (chunk_index, text_chunk) in chunks.iter().enumerate() {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let stored = StoredChunk {
                id,
                document_id,
                chunk_index,
                content: text_chunk.content.clone(),
                length: text_chunk.length,
                start: text_chunk.start,
                end: text_chunk.end,
                handle: None,
            };

            let bytes = bincode::serialize(&stored)?;
            self.chunks_tree.insert(id.to_be_bytes(), bytes)?;
            ids.push(id);
            inserted.push(Chunk::from(stored));
        }

        if !ids.is_empty() {
            let bytes = bincode::serialize(&ids)?;
            self.doc_chunks_tree
                .insert(document_id.to_be_bytes(), bytes)?;
        }
        Ok(inserted)
    }

    pub fn get_chunk(&self, id: u64) -> Result<Option<Chunk>> {
        if let Some(bytes) = self.chunks_tree.get(id.to_be_bytes())? {
            let stored: StoredChunk = bincode::deserialize(&bytes)?;
            Ok(Some(Chunk::from(stored)))
        } else {
            Ok(None)
        }
    }

    /// All chunks of a document ordered by `chunk_index`.
    pub fn get_chunks_for_document(&self, document_id: u64) -> Result<Vec<Chunk>> {
        let ids = self.chunk_ids_for_document(document_id)?;
        let mut chunks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(chunk) = self.get_chunk(id)? {
                chunks.push(chunk);
            }
        }
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    /// Record the vector index handle on an already-stored chunk. No-op for
    /// unknown ids.
    pub fn set_handle(&self, chunk_id: u64, handle: &str) -> Result<()> {
        if let Some(bytes) = self.chunks_tree.get(chunk_id.to_be_bytes())? {
            let mut stored: StoredChunk = bincode::deserialize(&bytes)?;
            stored.handle = Some(handle.to_string());
            let bytes = bincode::serialize(&stored)?;
            self.chunks_tree.insert(chunk_id.to_be_bytes(), bytes)?;
        }
        Ok(())
    }

    /// Remove every chunk of a document. Idempotent, returns the number of
    /// chunks removed.
    pub fn delete_chunks_for_document(&self, document_id: u64) -> Result<usize> {
        let ids = self.chunk_ids_for_document(document_id)?;
        let removed = ids.len();
        for id in ids {
            self.chunks_tree.remove(id.to_be_bytes())?;
        }
        self.doc_chunks_tree.remove(document_id.to_be_bytes())?;
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.chunks_tree.iter() {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn chunk_ids_for_document(&self, document_id: u64) -> Result<Vec<u64>> {
        if let Some(bytes) = self.doc_chunks_tree.get(document_id.to_be_bytes())? {
            let ids: Vec<u64> = bincode::deserialize(&bytes)?;
            Ok(ids)
        } else {
            Ok(Vec::new())
        }
    }
}
