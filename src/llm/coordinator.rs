//! Tool Coordinator for Multi-Turn Tool Calling
//!
//! `ToolCoordinator` drives one question through a bounded tool loop as an
//! explicit state machine:
//!
//! ```text
//! Thinking ──FinalAnswer──▶ Responding ──▶ Done
//!    ▲  │
//!    │  └──ToolInvocation──▶ ToolCall ─┐
//!    └─────────────────────────────────┘
//! ```
//!
//! - `Thinking` sends the conversation and tool definitions to the model
//! - `ToolCall` runs the requested tools and appends their results
//! - `Responding` holds the final answer
//!
//! The total number of tool invocations is capped. A turn that would push the
//! count past the cap fails with [`AppError::AgentLoopExceeded`]. Unknown or
//! failing tools are reported back to the model as error results so it can
//! recover; provider errors abort the loop.
//!
//! # Example
//!
//! ```rust,ignore
//! let coordinator = ToolCoordinator::new(client, registry, ToolCallingConfig::default());
//! let outcome = coordinator.execute(Some("Answer from the document."), "What was revenue?").await?;
//! println!("{} ({} tool calls)", outcome.content, outcome.tool_calls.len());
//! ```

use crate::llm::client::{LLMClient, ModelTurn};
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, MessageRole, Result, ToolCall};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Default cap on tool invocations per answer.
pub const DEFAULT_MAX_TOOL_CALLS: usize = 5;

#[derive(Debug, Clone)]
pub struct ToolCallingConfig {
    /// Maximum number of tool invocations across the whole loop.
    pub max_tool_calls: usize,

    /// Timeout for individual tool execution.
    pub tool_timeout: Duration,
}

impl Default for ToolCallingConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// Record of a single tool call execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Unique identifier for this tool call (from the LLM).
    pub id: String,
    /// Name of the tool that was called.
    pub name: String,
    /// Arguments passed to the tool.
    pub arguments: serde_json::Value,
    /// Result returned by the tool (or error object).
    pub result: serde_json::Value,
    /// Whether the tool execution was successful.
    pub success: bool,
    /// Time taken to execute the tool in milliseconds.
    pub duration_ms: u64,
    /// Error message if the tool failed.
    pub error: Option<String>,
}

/// A message in a tool-calling conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// The call this message answers (only for Tool role).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationMessage {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// Create an assistant message with optional tool calls.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool result message. String results are passed through as-is,
    /// anything else is JSON-encoded.
    pub fn tool_result(tool_call_id: impl Into<String>, result: &serde_json::Value) -> Self {
        let content = match result {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Self {
            role: MessageRole::Tool,
            content,
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Result of a complete tool coordination session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Final text response from the model.
    pub content: String,

    /// All tool calls made during the session, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,

    /// Number of model round-trips performed.
    pub iterations: usize,

    /// Full message history, including tool traffic.
    pub message_history: Vec<ConversationMessage>,
}

#[derive(Debug)]
enum AgentState {
    Thinking,
    ToolCall(Vec<ToolCall>),
    Responding(String),
    Done,
}

pub struct ToolCoordinator {
    client: Arc<dyn LLMClient>,
    registry: Arc<ToolRegistry>,
    config: ToolCallingConfig,
}

impl ToolCoordinator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        registry: Arc<ToolRegistry>,
        config: ToolCallingConfig,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Create a new ToolCoordinator with default configuration.
    pub fn with_defaults(client: Arc<dyn LLMClient>, registry: Arc<ToolRegistry>) -> Self {
        Self::new(client, registry, ToolCallingConfig::default())
    }

    /// Run the tool loop for one prompt until the model answers.
    pub async fn execute(&self, system: Option<&str>, prompt: &str) -> Result<AgentOutcome> {
        let tools = self.registry.get_tool_definitions();
        let mut messages: Vec<ConversationMessage> = Vec::new();
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut iterations = 0usize;
        let mut answer: Option<String> = None;

        if let Some(sys) = system {
            messages.push(ConversationMessage::system(sys));
        }
        messages.push(ConversationMessage::user(prompt));

        let mut state = AgentState::Thinking;
        loop {
            state = match state {
                AgentState::Thinking => {
                    iterations += 1;
                    let response = self.client.generate_with_tools(&messages, &tools).await?;

                    match response.into_turn() {
                        ModelTurn::FinalAnswer(text) => {
                            messages.push(ConversationMessage::assistant(text.clone(), Vec::new()));
                            AgentState::Responding(text)
                        }
                        ModelTurn::ToolInvocation { content, calls } => {
                            if records.len() + calls.len() > self.config.max_tool_calls {
                                tracing::warn!(
                                    limit = self.config.max_tool_calls,
                                    used = records.len(),
                                    requested = calls.len(),
                                    "Tool call budget exhausted"
                                );
                                return Err(AppError::AgentLoopExceeded {
                                    limit: self.config.max_tool_calls,
                                });
                            }
                            messages.push(ConversationMessage::assistant(content, calls.clone()));
                            AgentState::ToolCall(calls)
                        }
                    }
                }
                AgentState::ToolCall(calls) => {
                    for record in self.execute_tool_calls(&calls, iterations).await {
                        messages.push(ConversationMessage::tool_result(&record.id, &record.result));
                        records.push(record);
                    }
                    AgentState::Thinking
                }
                AgentState::Responding(text) => {
                    answer = Some(text);
                    AgentState::Done
                }
                AgentState::Done => break,
            };
        }

        let content = answer
            .ok_or_else(|| AppError::Internal("Tool loop finished without an answer".to_string()))?;

        tracing::debug!(
            iterations,
            tool_calls = records.len(),
            model = self.client.model_name(),
            "Tool loop finished"
        );

        Ok(AgentOutcome {
            content,
            tool_calls: records,
            iterations,
            message_history: messages,
        })
    }

    /// Run the calls of one model turn concurrently; results keep request order.
    async fn execute_tool_calls(&self, calls: &[ToolCall], iteration: usize) -> Vec<ToolCallRecord> {
        join_all(calls.iter().map(|call| self.execute_single_tool(call, iteration))).await
    }

    /// Failures become error records instead of aborting the loop.
    async fn execute_single_tool(&self, call: &ToolCall, iteration: usize) -> ToolCallRecord {
        let start = Instant::now();

        let result = timeout(
            self.config.tool_timeout,
            self.registry.execute(&call.name, call.arguments.clone()),
        )
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let (result, error) = match result {
            Ok(Ok(value)) => (value, None),
            Ok(Err(e)) => (serde_json::json!({"error": e.to_string()}), Some(e.to_string())),
            Err(_) => (
                serde_json::json!({"error": "Tool execution timed out"}),
                Some("Tool execution timed out".to_string()),
            ),
        };

        match &error {
            None => tracing::info!(tool = %call.name, iteration, duration_ms, "Tool succeeded"),
            Some(e) => tracing::warn!(tool = %call.name, iteration, error = %e, "Tool failed"),
        }

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            success: error.is_none(),
            duration_ms,
            error,
        }
    }

    pub fn client(&self) -> &Arc<dyn LLMClient> {
        &self.client
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ToolCallingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::LLMResponse;
    use crate::tools::Tool;
    use crate::types::ToolDefinition;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Replays canned responses in order.
    struct ScriptedClient {
        responses: Mutex<Vec<LLMResponse>>,
    }

    impl ScriptedClient {
        fn new(mut responses: Vec<LLMResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
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
                .pop()
                .ok_or_else(|| AppError::ProviderUnavailable("script exhausted".to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct LookupTool;

    #[async_trait]
    impl Tool for LookupTool {
        fn name(&self) -> &str {
            "lookup"
        }

        fn description(&self) -> &str {
            "Look something up"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"query": {"type": "string"}}})
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            match args["query"].as_str() {
                Some(q) => Ok(Value::String(format!("found: {}", q))),
                None => Err(AppError::InvalidInput("missing query".to_string())),
            }
        }
    }

    fn final_answer(text: &str) -> LLMResponse {
        LLMResponse {
            content: text.to_string(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }
    }

    fn tool_request(id: &str, name: &str, args: Value) -> LLMResponse {
        LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: "tool_calls".to_string(),
        }
    }

    fn coordinator(responses: Vec<LLMResponse>, max_tool_calls: usize) -> ToolCoordinator {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(LookupTool));
        ToolCoordinator::new(
            Arc::new(ScriptedClient::new(responses)),
            Arc::new(registry),
            ToolCallingConfig {
                max_tool_calls,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_direct_answer_skips_tools() {
        let outcome = coordinator(vec![final_answer("Hello")], 5)
            .execute(None, "Hi")
            .await
            .unwrap();
        assert_eq!(outcome.content, "Hello");
        assert!(outcome.tool_calls.is_empty());
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test]
    async fn test_tool_result_fed_back_to_model() {
        let outcome = coordinator(
            vec![
                tool_request("call_1", "lookup", json!({"query": "revenue"})),
                final_answer("Revenue was found"),
            ],
            5,
        )
        .execute(Some("system"), "What was revenue?")
        .await
        .unwrap();

        assert_eq!(outcome.content, "Revenue was found");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls.len(), 1);
        assert!(outcome.tool_calls[0].success);

        let tool_msg = outcome
            .message_history
            .iter()
            .find(|m| m.role == MessageRole::Tool)
            .unwrap();
        assert_eq!(tool_msg.content, "found: revenue");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let outcome = coordinator(
            vec![
                tool_request("call_1", "web_search", json!({"query": "x"})),
                final_answer("Recovered"),
            ],
            5,
        )
        .execute(None, "q")
        .await
        .unwrap();

        assert_eq!(outcome.content, "Recovered");
        assert!(!outcome.tool_calls[0].success);
        assert!(outcome.tool_calls[0]
            .error
            .as_deref()
            .unwrap()
            .contains("web_search"));
    }

    #[tokio::test]
    async fn test_budget_exceeded_fails() {
        let script = (0..4)
            .map(|i| tool_request(&format!("call_{}", i), "lookup", json!({"query": "again"})))
            .collect();
        let result = coordinator(script, 3).execute(None, "loop forever").await;
        assert!(matches!(
            result,
            Err(AppError::AgentLoopExceeded { limit: 3 })
        ));
    }

    #[tokio::test]
    async fn test_budget_allows_exactly_the_limit() {
        let mut script: Vec<LLMResponse> = (0..2)
            .map(|i| tool_request(&format!("call_{}", i), "lookup", json!({"query": "q"})))
            .collect();
        script.push(final_answer("done"));
        let outcome = coordinator(script, 2).execute(None, "q").await.unwrap();
        assert_eq!(outcome.tool_calls.len(), 2);
        assert_eq!(outcome.content, "done");
    }

    #[tokio::test]
    async fn test_provider_failure_aborts() {
        let result = coordinator(vec![], 5).execute(None, "q").await;
        assert!(matches!(result, Err(AppError::ProviderUnavailable(_))));
    }

    #[test]
    fn test_tool_result_message_encoding() {
        let text = ConversationMessage::tool_result("a", &json!("plain"));
        assert_eq!(text.content, "plain");
        let object = ConversationMessage::tool_result("b", &json!({"result": 42}));
        assert_eq!(object.content, r#"{"result":42}"#);
        assert_eq!(object.role, MessageRole::Tool);
    }
}
