//! Embedding providers.
//!
//! [`EmbeddingProvider`] turns text into fixed-length vectors. The index uses
//! the same provider for building and querying, so the vectors it compares
//! always come from one model.
//!
//! - [`OpenAIEmbeddings`] - any OpenAI-compatible `/embeddings` endpoint
//!   (OpenAI, Ollama's `/v1` API, vLLM, ...)
//! - [`LocalEmbeddings`] - fastembed ONNX models, behind the `local-embeddings` feature

use crate::llm::{OLLAMA_API_BASE, OPENAI_API_BASE};
use crate::types::{AppError, Result};
use crate::utils::config::{resolve_secret, EmbeddingProviderKind, EmbeddingsConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. The result has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmbeddingProvider("Provider returned no vector".to_string()))
    }

    fn model_name(&self) -> &str;
}

/// Build the embedding provider selected in the configuration.
pub fn create_embedding_provider(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        EmbeddingProviderKind::OpenAI => Ok(Arc::new(OpenAIEmbeddings::new(
            resolve_secret(&config.api_key_env),
            config.api_base.clone().unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            config.model.clone(),
            config.timeout(),
        )?)),
        EmbeddingProviderKind::Ollama => Ok(Arc::new(OpenAIEmbeddings::new(
            String::new(),
            config.api_base.clone().unwrap_or_else(|| OLLAMA_API_BASE.to_string()),
            config.model.clone(),
            config.timeout(),
        )?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProviderKind::Local => Ok(Arc::new(LocalEmbeddings::new(&config.model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProviderKind::Local => Err(AppError::Config(
            "Local embeddings require the 'local-embeddings' feature".to_string(),
        )),
    }
}

// ============================================================================
// OpenAI-compatible embeddings
// ============================================================================

pub struct OpenAIEmbeddings {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIEmbeddings {
    pub fn new(api_key: String, api_base: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.api_base)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.model, batch_size = texts.len(), "Embedding batch");

        let mut request = self.client.post(self.endpoint()).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::EmbeddingProvider(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingProvider(format!(
                "Embedding API returned {}: {}",
                status, body
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::EmbeddingProvider(format!("Malformed response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(AppError::EmbeddingProvider(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Local fastembed embeddings
// ============================================================================

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbeddings;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::EmbeddingProvider;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::{Arc, Mutex};

    pub struct LocalEmbeddings {
        model: Arc<Mutex<TextEmbedding>>,
        name: String,
    }

    impl LocalEmbeddings {
        pub fn new(model_name: &str) -> Result<Self> {
            let model_type = match model_name {
                "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
                "sentence-transformers/all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
                _ => EmbeddingModel::BGESmallENV15,
            };
            let model = TextEmbedding::try_new(
                InitOptions::new(model_type).with_show_download_progress(true),
            )
            .map_err(|e| AppError::EmbeddingProvider(e.to_string()))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
                name: model_name.to_string(),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LocalEmbeddings {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            let texts = texts.to_vec();

            tokio::task::spawn_blocking(move || {
                let mut guard = model
                    .lock()
                    .map_err(|_| AppError::Internal("Embedding model lock poisoned".to_string()))?;
                guard
                    .embed(texts, None)
                    .map_err(|e| AppError::EmbeddingProvider(e.to_string()))
            })
            .await
            .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}
