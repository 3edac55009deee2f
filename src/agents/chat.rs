//! General chat with conversation memory.

use crate::agents::Agent;
use crate::llm::LLMClient;
use crate::memory::ConversationHistory;
use crate::types::{Message, Result};
use crate::utils::config::ChatConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_CHAT_PROMPT: &str =
    "You are a friendly, helpful assistant. Keep track of what the user tells you during the conversation.";

pub struct GeneralChatSession {
    llm: Arc<dyn LLMClient>,
    system_prompt: String,
    window: Option<usize>,
    history: Mutex<ConversationHistory>,
}

impl GeneralChatSession {
    pub fn new(llm: Arc<dyn LLMClient>, config: &ChatConfig) -> Self {
        Self {
            llm,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAT_PROMPT.to_string()),
            window: config.history_window,
            history: Mutex::new(ConversationHistory::new()),
        }
    }

    /// Ask the model with the stored history plus `message`, then store the
    /// exchange.
    ///
    /// The lock is held for the whole exchange so concurrent callers never
    /// interleave turns. Nothing is stored until the model has replied, so a
    /// failed or cancelled call leaves the history untouched.
    pub async fn respond(&self, message: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        let prompt = history.to_prompt(&self.system_prompt, message, self.window);

        match self.llm.generate_with_history(&prompt).await {
            Ok(reply) => {
                history.record_exchange(message, reply.clone());
                tracing::debug!(turns = history.len(), "Chat exchange stored");
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat model call failed, user turn discarded");
                Err(e)
            }
        }
    }

    /// Copy of the stored conversation.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.messages().to_vec()
    }

    pub async fn turn_count(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl Agent for GeneralChatSession {
    async fn respond(&self, input: &str) -> Result<String> {
        GeneralChatSession::respond(self, input).await
    }

    fn name(&self) -> &str {
        "chat"
    }
}
