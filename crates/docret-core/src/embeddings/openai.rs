//! OpenAI embeddings over the HTTP API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{non_blank_indexed, zero_vector, Embedder};

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// text-embedding-ada-002 vector width
const DEFAULT_DIMENSION: usize = 1536;
/// The API rejects larger input arrays
const DEFAULT_BATCH_LIMIT: usize = 100;

/// Remote embedder backed by the OpenAI embeddings endpoint.
pub struct OpenAiEmbedder {
    model: String,
    api_key: String,
    dimension: usize,
    batch_limit: usize,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            dimension: DEFAULT_DIMENSION,
            batch_limit: DEFAULT_BATCH_LIMIT,
            client: Client::new(),
        }
    }

    /// Override the vector dimension for models other than ada-002.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Override the per-request input cap.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.max(1);
        self
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(count = inputs.len(), model = %self.model, "requesting embeddings");

        let resp = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": inputs,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI embeddings failed ({}): {}", status, body));
        }

        let parsed: EmbeddingResponse = resp.json().await?;
        if parsed.data.len() != inputs.len() {
            return Err(anyhow!(
                "Mismatched embedding count: got {}, expected {}",
                parsed.data.len(),
                inputs.len()
            ));
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(zero_vector(self.dimension));
        }
        let mut embeddings = self.request_embeddings(&[trimmed.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = vec![zero_vector(self.dimension); texts.len()];
        let pending = non_blank_indexed(texts);

        for batch in pending.chunks(self.batch_limit) {
            let inputs: Vec<String> = batch.iter().map(|(_, t)| t.clone()).collect();
            let embeddings = self.request_embeddings(&inputs).await?;
            for ((position, _), embedding) in batch.iter().zip(embeddings) {
                out[*position] = embedding;
            }
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "openai"
    }
}
