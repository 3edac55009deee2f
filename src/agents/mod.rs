//! Conversational agents.
//!
//! - [`document`] - tool-using agent that answers from an uploaded document
//! - [`chat`] - general chat with conversation memory
//! - [`router`] - holds the session state and picks the agent per question

pub mod chat;
pub mod document;
pub mod router;

use crate::types::Result;
use async_trait::async_trait;

pub use chat::GeneralChatSession;
pub use document::DocumentAgent;
pub use router::{DocumentSession, SessionRouter};

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Produce a reply to one user input.
    async fn respond(&self, input: &str) -> Result<String>;

    fn name(&self) -> &str;
}
