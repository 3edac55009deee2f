//! In-memory embedding index over one document's chunks.
//!
//! The index is built once per upload and never mutated afterwards. Build is
//! all-or-nothing: if any batch fails to embed, no index value exists.
//! Search is exact (every stored vector is scored), which is plenty for a
//! single uploaded document.

use crate::rag::chunker::DocumentChunk;
use crate::rag::distance::DistanceMetric;
use crate::rag::embeddings::EmbeddingProvider;
use crate::types::{AppError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Default number of chunk texts sent to the provider per request.
pub const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    pub batch_size: usize,
    pub metric: DistanceMetric,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            metric: DistanceMetric::default(),
        }
    }
}

/// A chunk together with its similarity to the query. Higher is closer.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

struct IndexEntry {
    chunk: DocumentChunk,
    vector: Vec<f32>,
}

pub struct DocumentIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
    metric: DistanceMetric,
    provider: Arc<dyn EmbeddingProvider>,
}

impl DocumentIndex {
    /// Embed every chunk and store the `(chunk, vector)` pairs.
    ///
    /// The provider is kept so queries are embedded by the same model.
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        provider: Arc<dyn EmbeddingProvider>,
        options: IndexOptions,
    ) -> Result<Self> {
        let start = Instant::now();
        let batch_size = options.batch_size.max(1);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedded = provider.embed_batch(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(AppError::EmbeddingProvider(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension || v.is_empty()) {
            return Err(AppError::EmbeddingProvider(format!(
                "Chunk {} has dimension {}, expected {}",
                bad,
                vectors[bad].len(),
                dimension
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        tracing::info!(
            chunks = entries.len(),
            dimension,
            metric = %options.metric,
            model = provider.model_name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Built document index"
        );

        Ok(Self {
            entries,
            dimension,
            metric: options.metric,
            provider,
        })
    }

    /// Embed `text` and return up to `k` chunks, nearest first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(AppError::EmptyIndex);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.provider.embed(text).await?;
        self.search_by_vector(&vector, k)
    }

    /// Rank stored chunks against an already embedded query.
    ///
    /// Ties keep original chunk order.
    pub fn search_by_vector(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(AppError::EmptyIndex);
        }
        if vector.len() != self.dimension {
            return Err(AppError::EmbeddingProvider(format!(
                "Query has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: self.metric.similarity(vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(k);

        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Stored chunks in document order.
    pub fn chunks(&self) -> impl Iterator<Item = &DocumentChunk> {
        self.entries.iter().map(|e| &e.chunk)
    }
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("entries", &self.entries.len())
            .field("dimension", &self.dimension)
            .field("metric", &self.metric)
            .field("model", &self.provider.model_name())
            .finish()
    }
}
