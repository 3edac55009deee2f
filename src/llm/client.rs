//! LLM Client abstractions and provider management
//!
//! Both supported providers speak the OpenAI chat-completions protocol:
//! - **OpenAI**: hosted API (or any compatible gateway via `api_base`)
//! - **Ollama**: local inference through its `/v1` compatibility endpoint

use crate::llm::coordinator::ConversationMessage;
use crate::llm::openai::OpenAIClient;
use crate::types::{Result, ToolCall, ToolDefinition};
use crate::utils::config::{resolve_secret, LlmConfig, LlmProviderKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a reply to a conversation (system, user and assistant turns).
    async fn generate_with_history(&self, messages: &[ConversationMessage]) -> Result<String>;

    /// Generate with tool calling support.
    ///
    /// `messages` may contain assistant tool requests and tool results from
    /// earlier rounds of the same loop.
    async fn generate_with_tools(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from an LLM generation request
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

/// What the model decided to do on one turn of the tool loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    FinalAnswer(String),
    ToolInvocation {
        /// Text the model emitted alongside the calls, usually empty.
        content: String,
        calls: Vec<ToolCall>,
    },
}

impl LLMResponse {
    /// A response with any tool calls is a tool invocation, whatever its
    /// finish reason says.
    pub fn into_turn(self) -> ModelTurn {
        if self.tool_calls.is_empty() {
            ModelTurn::FinalAnswer(self.content)
        } else {
            ModelTurn::ToolInvocation {
                content: self.content,
                calls: self.tool_calls,
            }
        }
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider, reached through its OpenAI-compatible API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434/v1".to_string(),
    ///     model: "llama3.1".to_string(),
    /// };
    /// ```
    ///
    /// Tool calling needs a model that supports it (`llama3.1`, `qwen2.5`, `mistral-nemo`).
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Resolve the provider described by the `[llm]` config section.
    pub fn from_config(config: &LlmConfig) -> Self {
        match config.provider {
            LlmProviderKind::OpenAI => Provider::OpenAI {
                api_key: resolve_secret(&config.api_key_env),
                api_base: config
                    .api_base
                    .clone()
                    .unwrap_or_else(|| OPENAI_API_BASE.to_string()),
                model: config.model.clone(),
            },
            LlmProviderKind::Ollama => Provider::Ollama {
                base_url: config
                    .api_base
                    .clone()
                    .unwrap_or_else(|| OLLAMA_API_BASE.to_string()),
                model: config.model.clone(),
            },
        }
    }

    /// Create a client instance for this provider
    pub fn create_client(&self, temperature: f32, timeout: Duration) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                temperature,
                timeout,
            )?)),

            Provider::Ollama { base_url, model } => Ok(Arc::new(OpenAIClient::new(
                String::new(),
                base_url.clone(),
                model.clone(),
                temperature,
                timeout,
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

/// Configuration-based client factory
///
/// The answering agent and the general chat session use the same model at
/// different temperatures, so the factory hands out one client per role.
pub struct LLMClientFactory {
    provider: Provider,
    config: LlmConfig,
}

impl LLMClientFactory {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            provider: Provider::from_config(config),
            config: config.clone(),
        }
    }

    /// Client for document answering (`llm.agent_temperature`).
    pub fn agent_client(&self) -> Result<Arc<dyn LLMClient>> {
        self.provider
            .create_client(self.config.agent_temperature, self.config.timeout())
    }

    /// Client for general chat (`llm.chat_temperature`).
    pub fn chat_client(&self) -> Result<Arc<dyn LLMClient>> {
        self.provider
            .create_client(self.config.chat_temperature, self.config.timeout())
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}
