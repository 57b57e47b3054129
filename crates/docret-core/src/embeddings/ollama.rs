//! Local embeddings through an Ollama server.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use tracing::debug;

use super::{non_blank_indexed, zero_vector, Embedder};

/// nomic-embed-text vector width
const DEFAULT_DIMENSION: usize = 768;

/// Local embedder backed by an Ollama server.
///
/// The embeddings endpoint takes one prompt per request, so batches are a
/// sequential per-text loop with no cap.
pub struct OllamaEmbedder {
    model: String,
    base_url: String,
    dimension: usize,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(model: impl Into<String>) -> Self {
        let base_url =
            env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        Self {
            model: model.into(),
            base_url,
            dimension: DEFAULT_DIMENSION,
            client: Client::new(),
        }
    }

    /// Override the vector dimension for models other than nomic-embed-text.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!(model = %self.model, "requesting embedding");

        let resp = self
            .client
            .post(format!(
                "{}/api/embeddings",
                self.base_url.trim_end_matches('/')
            ))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama embeddings failed ({}): {}", status, body));
        }

        let json: serde_json::Value = resp.json().await?;
        let embedding = json["embedding"]
            .as_array()
            .ok_or_else(|| anyhow!("No embedding field in Ollama response"))?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|f| f as f32)
            .collect::<Vec<f32>>();
        Ok(embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(zero_vector(self.dimension));
        }
        self.request_embedding(trimmed).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = vec![zero_vector(self.dimension); texts.len()];
        for (position, text) in non_blank_indexed(texts) {
            out[position] = self.request_embedding(&text).await?;
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_text_embeds_to_zero_vector_without_network() {
        let embedder = OllamaEmbedder::new("nomic-embed-text");

        let single = embedder.embed_one("").await.unwrap();
        assert_eq!(single, zero_vector(768));

        let batch = embedder.embed_batch(&["  \n".to_string()]).await.unwrap();
        assert_eq!(batch, vec![zero_vector(768)]);
    }
}
