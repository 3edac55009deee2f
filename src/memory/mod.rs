//! Conversation memory for the general chat session.
//!
//! History is append-only and grows for the lifetime of the process. A
//! window can limit how much of it is *sent* to the model; storage itself is
//! never truncated.

use crate::llm::coordinator::ConversationMessage;
use crate::types::{Message, MessageRole};

/// Ordered `(role, content, timestamp)` turns of one conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Store one complete exchange. Turns are only recorded once the model
    /// has replied, so the history never holds an unanswered user message.
    pub fn record_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.push(MessageRole::User, user);
        self.push(MessageRole::Assistant, reply);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Build the model request: system prompt, the stored history, then the
    /// `pending` user message.
    ///
    /// With a window set, only the last `window` messages (counting `pending`)
    /// are sent. `pending` is always included.
    pub fn to_prompt(
        &self,
        system: &str,
        pending: &str,
        window: Option<usize>,
    ) -> Vec<ConversationMessage> {
        let recent = match window {
            Some(size) => truncate_history(&self.messages, size.saturating_sub(1)),
            None => &self.messages[..],
        };

        std::iter::once(ConversationMessage::system(system))
            .chain(recent.iter().map(|m| match m.role {
                MessageRole::System => ConversationMessage::system(m.content.clone()),
                MessageRole::User => ConversationMessage::user(m.content.clone()),
                MessageRole::Assistant | MessageRole::Tool => {
                    ConversationMessage::assistant(m.content.clone(), Vec::new())
                }
            }))
            .chain(std::iter::once(ConversationMessage::user(pending)))
            .collect()
    }
}

/// The most recent `window_size` messages of `history`.
pub fn truncate_history(history: &[Message], window_size: usize) -> &[Message] {
    if history.len() <= window_size {
        history
    } else {
        &history[history.len() - window_size..]
    }
}
