//! Answering agent bound to one uploaded document.

use crate::agents::Agent;
use crate::llm::coordinator::{AgentOutcome, ToolCallingConfig, ToolCoordinator};
use crate::llm::LLMClient;
use crate::rag::retriever::Retriever;
use crate::tools::ToolRegistry;
use crate::types::Result;
use crate::utils::config::AgentConfig;
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_DOCUMENT_PROMPT: &str = "You are a helpful assistant answering questions about a document the user uploaded. \
Use the search_document tool to look up relevant passages before answering. \
Base your answer on the retrieved content. If the document does not contain the answer, say so.";

/// Answers questions by letting the model search the document's index.
///
/// Holds no state between calls apart from the bound retriever.
pub struct DocumentAgent {
    coordinator: ToolCoordinator,
    retriever: Arc<Retriever>,
    system_prompt: String,
}

impl DocumentAgent {
    pub fn new(llm: Arc<dyn LLMClient>, retriever: Arc<Retriever>, config: &AgentConfig) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(retriever.clone());

        let coordinator = ToolCoordinator::new(
            llm,
            Arc::new(registry),
            ToolCallingConfig {
                max_tool_calls: config.max_tool_calls,
                ..Default::default()
            },
        );

        Self {
            coordinator,
            retriever,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_DOCUMENT_PROMPT.to_string()),
        }
    }

    pub async fn answer(&self, query: &str) -> Result<String> {
        Ok(self.answer_detailed(query).await?.content)
    }

    /// Answer plus the tool calls and messages that produced it.
    pub async fn answer_detailed(&self, query: &str) -> Result<AgentOutcome> {
        let outcome = self
            .coordinator
            .execute(Some(&self.system_prompt), query)
            .await?;

        tracing::info!(
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls.len(),
            "Document question answered"
        );

        Ok(outcome)
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl Agent for DocumentAgent {
    async fn respond(&self, input: &str) -> Result<String> {
        self.answer(input).await
    }

    fn name(&self) -> &str {
        "document"
    }
}
