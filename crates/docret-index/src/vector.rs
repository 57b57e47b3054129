use anyhow::{anyhow, Result};
use arrow::array::{ArrayRef, Float32Array, RecordBatch, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use async_trait::async_trait;
use docret_core::models::SimilarityResult;
use futures::stream::TryStreamExt;
use tracing::debug;

use lance::dataset::{Dataset, WriteMode, WriteParams};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{chunk_handle, IndexItem, IndexStats, VectorStore};

/// Widest window the owner-filtered search will fetch before giving up on
/// finding more rows for the owner.
const MAX_FETCH: usize = 256;

/// Vector index persisted as a lance dataset.
///
/// Lance nearest-neighbour scans return global top-k, so owner scoping
/// over-fetches and filters the fetched rows, widening the window until
/// enough rows for the owner are in hand or `MAX_FETCH` is reached. When
/// the cap is hit with the owner's rows spread thinly through the index,
/// the returned set may miss true top-k rows beyond the window.
///
/// The scan reports an L2 distance per row; scores are `1 / (1 + d)`. A
/// backend returning cosine or inner-product values would need a
/// different conversion.
pub struct LanceVectorIndex {
    dataset: RwLock<Option<Dataset>>,
    index_path: std::path::PathBuf,
    dimension: usize,
}

impl LanceVectorIndex {
    pub async fn new(index_path: &Path, dimension: usize) -> Result<Self> {
        let dataset = if index_path.exists() {
            match Dataset::open(index_path.to_str().unwrap()).await {
                Ok(ds) => Some(ds),
                Err(_) => None,
            }
        } else {
            None
        };

        Ok(Self {
            dataset: RwLock::new(dataset),
            index_path: index_path.to_path_buf(),
            dimension,
        })
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("handle", DataType::Utf8, false),
            Field::new("owner_id", DataType::Utf8, false),
            Field::new("document_id", DataType::UInt64, false),
            Field::new("chunk_id", DataType::UInt64, false),
            Field::new("chunk_index", DataType::UInt64, false),
            Field::new("content", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dimension as i32,
                ),
                false,
            ),
        ]))
    }

    /// Raw nearest-neighbour fetch. Returns `(owner_id, hit)` pairs in the
    /// order lance yields them, which is ascending by distance.
    async fn fetch_nearest(
        &self,
        dataset: &Dataset,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<(String, SimilarityResult)>> {
        let query_array = Float32Array::from(query.to_vec());

        let results = dataset
            .scan()
            .nearest("embedding", &query_array, k)?
            .try_into_stream()
            .await?;
        let mut batches = Vec::new();
        let mut stream = results;
        while let Some(batch) = stream.try_next().await? {
            batches.push(batch);
        }

        let mut rows = Vec::new();

        for batch in batches {
            let handles = batch
                .column_by_name("handle")
                .ok_or_else(|| anyhow!("Missing handle column"))?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("Failed to cast handle column"))?;

            let owners = batch
                .column_by_name("owner_id")
                .ok_or_else(|| anyhow!("Missing owner_id column"))?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("Failed to cast owner_id column"))?;

            let document_ids = batch
                .column_by_name("document_id")
                .ok_or_else(|| anyhow!("Missing document_id column"))?
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| anyhow!("Failed to cast document_id column"))?;

            let chunk_ids = batch
                .column_by_name("chunk_id")
                .ok_or_else(|| anyhow!("Missing chunk_id column"))?
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| anyhow!("Failed to cast chunk_id column"))?;

            let chunk_indices = batch
                .column_by_name("chunk_index")
                .ok_or_else(|| anyhow!("Missing chunk_index column"))?
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| anyhow!("Failed to cast chunk_index column"))?;

            let contents = batch
                .column_by_name("content")
                .ok_or_else(|| anyhow!("Missing content column"))?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("Failed to cast content column"))?;

            let distances = batch
                .column_by_name("_distance")
                .ok_or_else(|| anyhow!("Missing _distance column"))?
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| anyhow!("Failed to cast _distance column"))?;

            for i in 0..batch.num_rows() {
                let distance = distances.value(i);
                let similarity = 1.0 / (1.0 + distance);

                rows.push((
                    owners.value(i).to_string(),
                    SimilarityResult {
                        handle: handles.value(i).to_string(),
                        chunk_id: chunk_ids.value(i),
                        document_id: document_ids.value(i),
                        chunk_index: chunk_indices.value(i) as usize,
                        content: contents.value(i).to_string(),
                        score: similarity,
                    },
                ));
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl VectorStore for LanceVectorIndex {
    async fn add_batch(&self, items: &[IndexItem]) -> Result<Vec<String>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Validate the whole batch before writing anything.
        for item in items {
            if item.embedding.len() != self.dimension {
                return Err(anyhow!(
                    "embedding dimension {} does not match index dimension {}",
                    item.embedding.len(),
                    self.dimension
                ));
            }
        }

        let schema = self.schema();

        let handles: Vec<String> = items
            .iter()
            .map(|i| chunk_handle(i.document_id, i.chunk_id, i.chunk_index))
            .collect();
        let owner_ids: Vec<String> = items.iter().map(|i| i.owner_id.clone()).collect();
        let document_ids: Vec<u64> = items.iter().map(|i| i.document_id).collect();
        let chunk_ids: Vec<u64> = items.iter().map(|i| i.chunk_id).collect();
        let chunk_indices: Vec<u64> = items.iter().map(|i| i.chunk_index as u64).collect();
        let contents: Vec<String> = items.iter().map(|i| i.content.clone()).collect();

        let embeddings: Vec<f32> = items.iter().flat_map(|i| i.embedding.clone()).collect();

        let handle_array: ArrayRef = Arc::new(StringArray::from(handles.clone()));
        let owner_array: ArrayRef = Arc::new(StringArray::from(owner_ids));
        let document_array: ArrayRef = Arc::new(UInt64Array::from(document_ids));
        let chunk_array: ArrayRef = Arc::new(UInt64Array::from(chunk_ids));
        let chunk_index_array: ArrayRef = Arc::new(UInt64Array::from(chunk_indices));
        let content_array: ArrayRef = Arc::new(StringArray::from(contents));
        let embedding_array: ArrayRef = {
            let values = Float32Array::from(embeddings);
            let field = Arc::new(Field::new("item", DataType::Float32, true));
            Arc::new(arrow::array::FixedSizeListArray::new(
                field,
                self.dimension as i32,
                Arc::new(values),
                None,
            ))
        };

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                handle_array,
                owner_array,
                document_array,
                chunk_array,
                chunk_index_array,
                content_array,
                embedding_array,
            ],
        )?;

        let mut dataset_guard = self.dataset.write().await;
        let write_mode = if dataset_guard.is_some() {
            WriteMode::Append
        } else {
            WriteMode::Create
        };

        use arrow::array::RecordBatchIterator;
        let batches = vec![Ok(batch.clone())];
        let reader = RecordBatchIterator::new(batches.into_iter(), schema.clone());

        let dataset = Dataset::write(
            reader,
            self.index_path.to_str().unwrap(),
            Some(WriteParams {
                mode: write_mode,
                ..Default::default()
            }),
        )
        .await?;

        *dataset_guard = Some(dataset);
        debug!(count = items.len(), "indexed embedded chunks");
        Ok(handles)
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        owner_filter: Option<&str>,
        min_score: f32,
    ) -> Result<Vec<SimilarityResult>> {
        let dataset_guard = self.dataset.read().await;
        let dataset = match dataset_guard.as_ref() {
            Some(ds) => ds,
            None => return Ok(Vec::new()),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(anyhow!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            ));
        }

        let mut fetch = match owner_filter {
            Some(_) => limit.max(limit.saturating_mul(4).min(MAX_FETCH)),
            None => limit,
        };

        loop {
            let rows = self.fetch_nearest(dataset, query, fetch).await?;
            let exhausted = rows.len() < fetch;

            let mut hits: Vec<SimilarityResult> = rows
                .into_iter()
                .filter(|(owner, _)| owner_filter.map_or(true, |want| owner == want))
                .map(|(_, hit)| hit)
                .filter(|hit| hit.score >= min_score)
                .collect();

            if hits.len() >= limit || exhausted || owner_filter.is_none() || fetch >= MAX_FETCH {
                hits.sort_by(|a, b| {
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                hits.truncate(limit);
                return Ok(hits);
            }

            fetch = fetch.saturating_mul(2).min(MAX_FETCH);
            debug!(fetch, "widening owner-filtered search window");
        }
    }

    async fn delete_by_document(&self, document_id: u64) -> Result<()> {
        let mut dataset_guard = self.dataset.write().await;
        let dataset = match dataset_guard.as_mut() {
            Some(ds) => ds,
            None => return Ok(()),
        };

        let predicate = format!("document_id = {}", document_id);
        dataset.delete(&predicate).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let dataset_guard = self.dataset.read().await;
        let vectors = match dataset_guard.as_ref() {
            Some(ds) => ds.count_rows(None).await?,
            None => 0,
        };
        Ok(IndexStats {
            vectors,
            dimension: self.dimension,
            backend: "lance".to_string(),
        })
    }
}
