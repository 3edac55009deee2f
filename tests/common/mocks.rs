//! Mock implementations for testing.
//!
//! Deterministic stand-ins for the LLM and embedding providers, shared by the
//! integration tests so none of them touch the network.

#![allow(dead_code)]

use async_trait::async_trait;
use docchat::agents::SessionRouter;
use docchat::llm::{ConversationMessage, LLMClient, LLMResponse};
use docchat::rag::embeddings::EmbeddingProvider;
use docchat::types::{AppError, MessageRole, Result, ToolCall, ToolDefinition};
use docchat::utils::config::AppConfig;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============= LLM mocks =============

/// Mock LLM client with a fixed reply.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    tool_calls: Vec<ToolCall>,
    should_fail: bool,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            tool_calls: vec![],
            should_fail: false,
        }
    }

    /// Requests the same tool calls on every turn.
    pub fn with_tool_calls(response: &str, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            response: response.to_string(),
            tool_calls,
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            response: String::new(),
            tool_calls: vec![],
            should_fail: true,
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_history(&self, _messages: &[ConversationMessage]) -> Result<String> {
        if self.should_fail {
            return Err(AppError::ProviderUnavailable("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_tools(
        &self,
        _messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        if self.should_fail {
            return Err(AppError::ProviderUnavailable("Mock LLM failure".to_string()));
        }
        Ok(LLMResponse {
            content: self.response.clone(),
            tool_calls: self.tool_calls.clone(),
            finish_reason: if self.tool_calls.is_empty() {
                "stop".to_string()
            } else {
                "tool_calls".to_string()
            },
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Chat model that remembers names: "my name is X" earlier in the
/// conversation makes "what is my name" answer "Your name is X".
/// Every request is recorded for inspection.
#[derive(Default)]
pub struct MemoryChatClient {
    pub requests: Mutex<Vec<Vec<ConversationMessage>>>,
    fail_next: AtomicUsize,
}

impl MemoryChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` calls.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Vec<ConversationMessage> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LLMClient for MemoryChatClient {
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());

        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AppError::ProviderUnavailable("connection refused".to_string()));
        }

        let last = messages
            .last()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        if last.contains("what is my name") {
            let name = messages.iter().rev().find_map(|m| {
                let lower = m.content.to_lowercase();
                lower
                    .find("my name is ")
                    .filter(|_| m.role == MessageRole::User && !lower.contains("what is my name"))
                    .map(|pos| {
                        m.content[pos + "my name is ".len()..]
                            .trim_end_matches(['.', '!'])
                            .to_string()
                    })
            });
            return Ok(match name {
                Some(name) => format!("Your name is {}.", name),
                None => "I don't know your name yet.".to_string(),
            });
        }

        Ok(format!("You said: {}", messages.last().map(|m| m.content.as_str()).unwrap_or("")))
    }

    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        Ok(LLMResponse {
            content: self.generate_with_history(messages).await?,
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "memory-chat"
    }
}

/// Chat model that signals `started` and then never answers in test time.
#[derive(Default)]
pub struct StalledChatClient {
    pub started: Notify,
}

#[async_trait]
impl LLMClient for StalledChatClient {
    async fn generate_with_history(&self, _messages: &[ConversationMessage]) -> Result<String> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".to_string())
    }

    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        Ok(final_answer(&self.generate_with_history(messages).await?))
    }

    fn model_name(&self) -> &str {
        "stalled"
    }
}

/// Agent model that searches once with the user's question, then answers
/// with whatever the tool returned.
#[derive(Default)]
pub struct RetrievingAgentClient {
    pub calls: AtomicUsize,
}

impl RetrievingAgentClient {
    pub fn new() -> Self {
        Self::default()
    }
}

pub const ANSWER_PREFIX: &str = "From the document: ";

#[async_trait]
impl LLMClient for RetrievingAgentClient {
    async fn generate_with_history(&self, _messages: &[ConversationMessage]) -> Result<String> {
        Ok(String::new())
    }

    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(result) = messages.iter().rev().find(|m| m.role == MessageRole::Tool) {
            return Ok(LLMResponse {
                content: format!("{}{}", ANSWER_PREFIX, result.content),
                tool_calls: vec![],
                finish_reason: "stop".to_string(),
            });
        }

        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let tool = tools
            .first()
            .map(|t| t.name.clone())
            .ok_or_else(|| AppError::Internal("agent was given no tools".to_string()))?;

        Ok(LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: tool,
                arguments: json!({ "query": question }),
            }],
            finish_reason: "tool_calls".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "retrieving-agent"
    }
}

/// Replays canned responses in order, then fails.
pub struct ScriptedLLMClient {
    responses: Mutex<VecDeque<LLMResponse>>,
}

impl ScriptedLLMClient {
    pub fn new(responses: Vec<LLMResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate_with_history(&self, _messages: &[ConversationMessage]) -> Result<String> {
        Ok(String::new())
    }

    async fn generate_with_tools(
        &self,
        _messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::ProviderUnavailable("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn final_answer(text: &str) -> LLMResponse {
    LLMResponse {
        content: text.to_string(),
        tool_calls: vec![],
        finish_reason: "stop".to_string(),
    }
}

pub fn search_call(id: &str, query: &str) -> LLMResponse {
    LLMResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: "search_document".to_string(),
            arguments: json!({ "query": query }),
        }],
        finish_reason: "tool_calls".to_string(),
    }
}

// ============= Embedding mocks =============

pub const BAG_OF_WORDS_DIM: usize = 512;

/// Hashes lowercase alphanumeric tokens into a fixed-size count vector, so
/// texts sharing words score higher under cosine similarity.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    pub batches: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; BAG_OF_WORDS_DIM];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            // FNV-1a
            let hash = token.bytes().fold(0xcbf29ce484222325u64, |h, b| {
                (h ^ b as u64).wrapping_mul(0x100000001b3)
            });
            vector[(hash % BAG_OF_WORDS_DIM as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Bag-of-words embedder that stalls on batches containing `marker` until
/// `release` is notified. `stalled` fires when such a batch arrives.
pub struct GatedEmbedder {
    marker: String,
    pub stalled: Notify,
    pub release: Notify,
}

impl GatedEmbedder {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            stalled: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GatedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains(&self.marker)) {
            self.stalled.notify_one();
            self.release.notified().await;
        }
        Ok(texts.iter().map(|t| BagOfWordsEmbedder::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "gated-bag-of-words"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::EmbeddingProvider("embedding service returned 500".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

// ============= Fixtures =============

/// Small chunks so short test documents split into several chunks.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.rag.chunk_size = 200;
    config.rag.chunk_overlap = 20;
    config
}

pub fn test_router(
    config: &AppConfig,
    agent: Arc<dyn LLMClient>,
    chat: Arc<dyn LLMClient>,
) -> SessionRouter {
    SessionRouter::new(config, agent, chat, Arc::new(BagOfWordsEmbedder::new())).unwrap()
}

pub const FINANCE_REPORT: &str = "Company overview. Acme builds industrial widgets in three factories located in Ohio, Texas and Oregon.\n\n\
The quarterly revenue was 4.2 million dollars, up twelve percent on the previous quarter.\n\n\
Staffing. Headcount grew to 140 employees after hiring engineers for the new product line.\n\n\
Outlook. Management expects demand for widgets to remain strong through next year.";

pub const TRAVEL_GUIDE: &str = "Lisbon travel guide. The city is built on seven hills overlooking the Tagus river.\n\n\
Trams are the classic way to climb the hills; line 28 passes most sights.\n\n\
Pastries. The custard tarts from Belem are the most famous local treat.";
