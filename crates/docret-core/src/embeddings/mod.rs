//! Embedding provider abstraction.
//!
//! Providers turn text into fixed-dimension vectors. The process constructs
//! one provider and shares it as `Arc<dyn Embedder>`; providers are never
//! rebuilt per call. Blank text embeds to the zero vector rather than
//! failing, both for single and batched input.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text. Empty or whitespace-only input returns the
    /// provider's zero vector without touching the backend.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, order-preserving, one vector per input.
    ///
    /// Blank elements get the zero vector. Oversized input is split into
    /// sub-batches respecting the backend's cap. On backend failure the
    /// whole call errors; the result is never shorter than the input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Vector dimension, fixed for the provider's lifetime.
    fn dimension(&self) -> usize;

    /// Backend identity for stats and logging.
    fn name(&self) -> &str;
}

/// The defined embedding of blank text.
pub fn zero_vector(dimension: usize) -> Vec<f32> {
    vec![0.0; dimension]
}

/// Cosine similarity of two vectors, in [-1, 1].
///
/// Normalizes both vectors, then takes the dot product. Degenerate input
/// (zero norm, length mismatch, empty) yields 0.0 instead of a division
/// error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

/// Non-blank inputs with their original positions, trimmed for the backend.
///
/// The positions let callers write backend results into a zero-prefilled
/// output so blank elements keep the zero vector and order is preserved.
pub(crate) fn non_blank_indexed(texts: &[String]) -> Vec<(usize, String)> {
    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.trim().is_empty())
        .map(|(i, t)| (i, t.trim().to_string()))
        .collect()
}
