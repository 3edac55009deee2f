//! Fixed-k retrieval over a [`DocumentIndex`], exposed to agents as a tool.

use crate::rag::index::{DocumentIndex, ScoredChunk};
use crate::tools::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub const RETRIEVER_TOOL_NAME: &str = "search_document";
pub const RETRIEVER_TOOL_DESCRIPTION: &str = "Search for relevant content in the uploaded document.";

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_SEPARATOR: &str = "\n\n";

pub struct Retriever {
    index: Arc<DocumentIndex>,
    top_k: usize,
    separator: String,
}

impl Retriever {
    pub fn new(index: Arc<DocumentIndex>) -> Self {
        Self {
            index,
            top_k: DEFAULT_TOP_K,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<DocumentIndex> {
        &self.index
    }

    /// The `top_k` nearest chunks with their scores, nearest first.
    pub async fn retrieve_chunks(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        self.index.query(query, self.top_k).await
    }

    /// Nearest chunk texts joined by the separator, nearest first.
    pub async fn retrieve(&self, query: &str) -> Result<String> {
        let results = self.retrieve_chunks(query).await?;

        tracing::debug!(
            query,
            results = results.len(),
            top_score = results.first().map(|r| r.score),
            "Retrieved document context"
        );

        Ok(results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator))
    }
}

#[async_trait]
impl Tool for Retriever {
    fn name(&self) -> &str {
        RETRIEVER_TOOL_NAME
    }

    fn description(&self) -> &str {
        RETRIEVER_TOOL_DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the uploaded document"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::InvalidInput("missing required 'query' parameter".into()))?;

        tracing::info!(tool = RETRIEVER_TOOL_NAME, query, "Tool called");

        Ok(Value::String(self.retrieve(query).await?))
    }
}
