use anyhow::Result;
use async_trait::async_trait;
use docret_config::ChunkingConfig;
use docret_core::chunker::TextChunker;
use docret_core::embeddings::Embedder;
use docret_engine::{EngineError, RetrievalEngine};
use docret_index::{MemoryVectorIndex, VectorStore};
use docret_store::{ChunkStore, DocumentStore, Store};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const DIM: usize = 4;

/// Deterministic embedder: identical text always maps to the same vector,
/// so a query equal to a chunk's content scores a perfect match.
struct MockEmbedder;

impl MockEmbedder {
    fn vector_for(text: &str) -> Vec<f32> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![0.0; DIM];
        }
        let mut hasher = Sha256::new();
        hasher.update(trimmed.as_bytes());
        let digest = hasher.finalize();
        digest[..DIM].iter().map(|b| *b as f32 / 255.0).collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow::anyhow!("backend down"))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("backend down"))
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn build_engine(
    path: &Path,
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    overlap: usize,
) -> Result<RetrievalEngine> {
    let store = Store::open(&path.join("store"))?;
    let documents = Arc::new(DocumentStore::new(&store)?);
    let chunks = Arc::new(ChunkStore::new(&store)?);
    let chunker = TextChunker::new(ChunkingConfig {
        chunk_size,
        overlap,
    })?;
    let index: Arc<dyn VectorStore> = Arc::new(MemoryVectorIndex::new(DIM));
    Ok(RetrievalEngine::new(
        documents,
        chunks,
        chunker,
        embedder,
        index,
    ))
}

#[tokio::test]
async fn test_ingest_and_retrieve_context() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 40, 10)?;

    let doc = engine.create_document("alice", "mammals")?;
    let report = engine
        .ingest(
            doc.id,
            "alice",
            "Cats are mammals. Dogs are mammals too. Fish are not mammals.",
        )
        .await?;

    assert!(report.chunks_created >= 2);
    assert!(report.embedded_ok);
    assert_eq!(report.failed_embeddings, 0);
    assert!(engine.get_document(doc.id)?.processed);

    let chunks = engine.get_chunks(doc.id)?;
    assert_eq!(chunks.len(), report.chunks_created);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert!(chunk.handle.is_some());
    }

    let context = engine
        .retrieve_context("Cats are mammals.", "alice", 4000, 5, 0.0)
        .await?;
    assert!(!context.is_empty());
    assert!(context.contains(&format!("[Doc {}]:", doc.id)));

    Ok(())
}

#[tokio::test]
async fn test_search_ranks_exact_match_first() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let doc = engine.create_document("alice", "pets")?;
    engine
        .ingest(doc.id, "alice", "Cats purr softly at home.")
        .await?;

    let hits = engine
        .search("Cats purr softly at home.", "alice", 5, 0.0)
        .await?;
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert_eq!(hits[0].content, "Cats purr softly at home.");
    assert_eq!(hits[0].document_id, doc.id);

    Ok(())
}

#[tokio::test]
async fn test_owner_isolation() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let alice_doc = engine.create_document("alice", "alice notes")?;
    engine
        .ingest(alice_doc.id, "alice", "Cats purr softly at home.")
        .await?;

    let bob_doc = engine.create_document("bob", "bob notes")?;
    engine
        .ingest(bob_doc.id, "bob", "Dogs bark loudly at night.")
        .await?;

    // Even querying with bob's exact text, alice only sees her own chunks.
    let hits = engine
        .search("Dogs bark loudly at night.", "alice", 10, 0.0)
        .await?;
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.document_id == alice_doc.id));

    let context = engine
        .retrieve_context("Dogs bark loudly at night.", "carol", 4000, 5, 0.0)
        .await?;
    assert_eq!(context, "");

    Ok(())
}

#[tokio::test]
async fn test_reingest_replaces_previous_pass() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 40, 10)?;

    let doc = engine.create_document("alice", "doc")?;
    let first = engine
        .ingest(
            doc.id,
            "alice",
            "Cats are mammals. Dogs are mammals too. Fish are not mammals.",
        )
        .await?;
    assert!(first.chunks_created >= 2);

    let second = engine
        .ingest(doc.id, "alice", "Completely different content now.")
        .await?;
    assert_eq!(second.chunks_created, 1);

    // No stale chunks or vectors survive the second pass.
    let stats = engine.stats().await?;
    assert_eq!(stats.chunks, 1);
    assert_eq!(stats.index.vectors, 1);

    let hits = engine.search("Cats are mammals.", "alice", 10, 0.0).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].content, "Completely different content now.");
    assert_eq!(hits[0].chunk_index, 0);

    Ok(())
}

#[tokio::test]
async fn test_context_respects_max_chars() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let doc = engine.create_document("alice", "doc")?;
    let content = "x".repeat(100);
    engine.ingest(doc.id, "alice", &content).await?;

    // A 100-char chunk cannot fit in a 10-char budget; nothing is truncated.
    let context = engine
        .retrieve_context(&content, "alice", 10, 5, 0.0)
        .await?;
    assert_eq!(context, "");

    // An exact-fit budget admits the chunk whole.
    let context = engine
        .retrieve_context(&content, "alice", 100, 5, 0.0)
        .await?;
    assert_eq!(context, format!("[Doc {}]: {}", doc.id, content));

    Ok(())
}

#[tokio::test]
async fn test_context_stops_at_first_overflowing_item() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 40, 0)?;

    let doc = engine.create_document("alice", "doc")?;
    engine
        .ingest(doc.id, "alice", "Short cat fact. A considerably longer dog fact follows here.")
        .await?;

    // Query matches the first chunk exactly; it fits, the next chunk would
    // overflow and assembly stops there.
    let first_chunk = "Short cat fact.";
    let context = engine
        .retrieve_context(first_chunk, "alice", 20, 5, 0.0)
        .await?;
    assert_eq!(context, format!("[Doc {}]: {}", doc.id, first_chunk));

    Ok(())
}

#[tokio::test]
async fn test_ingest_unknown_document_fails() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let err = engine
        .ingest(999, "alice", "some text")
        .await
        .unwrap_err();
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::DocumentNotFound(id)) => assert_eq!(*id, 999),
        other => panic!("unexpected error: {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_empty_text_creates_zero_chunks() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let doc = engine.create_document("alice", "empty")?;
    let report = engine.ingest(doc.id, "alice", "   \n\t  ").await?;

    assert_eq!(report.chunks_created, 0);
    assert!(report.embedded_ok);
    assert!(engine.get_document(doc.id)?.processed);
    assert_eq!(engine.stats().await?.chunks, 0);

    Ok(())
}

#[tokio::test]
async fn test_embedding_failure_reports_partial_state() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(FailingEmbedder), 40, 10)?;

    let doc = engine.create_document("alice", "doc")?;
    let report = engine
        .ingest(
            doc.id,
            "alice",
            "Cats are mammals. Dogs are mammals too. Fish are not mammals.",
        )
        .await?;

    assert!(report.chunks_created >= 2);
    assert!(!report.embedded_ok);
    assert_eq!(report.failed_embeddings, report.chunks_created);

    // Chunks persisted for retry, document not marked processed.
    assert!(!engine.get_document(doc.id)?.processed);
    assert_eq!(engine.get_chunks(doc.id)?.len(), report.chunks_created);
    assert_eq!(engine.stats().await?.index.vectors, 0);

    // Retrieval degrades to an empty context instead of erroring.
    let context = engine.retrieve_context("cats", "alice", 4000, 5, 0.0).await?;
    assert_eq!(context, "");

    Ok(())
}

#[tokio::test]
async fn test_delete_document_removes_all_state() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let doc = engine.create_document("alice", "doc")?;
    engine
        .ingest(doc.id, "alice", "Cats purr softly at home.")
        .await?;

    engine.delete_document(doc.id).await?;

    let err = engine.get_document(doc.id).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::DocumentNotFound(_))
    ));

    let stats = engine.stats().await?;
    assert_eq!(stats.documents, 0);
    assert_eq!(stats.chunks, 0);
    assert_eq!(stats.index.vectors, 0);

    let hits = engine
        .search("Cats purr softly at home.", "alice", 5, 0.0)
        .await?;
    assert!(hits.is_empty());

    // Deleting again reports the document as gone.
    let err = engine.delete_document(doc.id).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::DocumentNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_ingest_of_different_documents() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(dir.path(), Arc::new(MockEmbedder), 200, 0)?;

    let doc_a = engine.create_document("alice", "a")?;
    let doc_b = engine.create_document("bob", "b")?;

    let (first, second) = tokio::join!(
        engine.ingest(doc_a.id, "alice", "Cats purr softly at home."),
        engine.ingest(doc_b.id, "bob", "Dogs bark loudly at night."),
    );

    assert!(first?.embedded_ok);
    assert!(second?.embedded_ok);
    assert_eq!(engine.stats().await?.index.vectors, 2);

    Ok(())
}
