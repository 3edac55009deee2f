//! LLM Provider Clients and Abstractions
//!
//! Everything that talks to a language model goes through the [`LLMClient`]
//! trait, so agents can be tested against scripted clients and pointed at any
//! OpenAI-compatible server in production.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] / [`LLMClientFactory`] - Build clients from the `[llm]` config section
//! - [`ToolCoordinator`] - Drives the bounded tool-calling loop
//!
//! # Example
//!
//! ```ignore
//! use docchat::llm::LLMClientFactory;
//!
//! let factory = LLMClientFactory::new(&config.llm);
//! let client = factory.chat_client()?;
//! let reply = client
//!     .generate_with_history(&[ConversationMessage::user("What is 2+2?")])
//!     .await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Bounded tool-calling loop.
pub mod coordinator;
/// OpenAI-compatible chat-completions client.
pub mod openai;

pub use client::{
    LLMClient, LLMClientFactory, LLMResponse, ModelTurn, Provider, OLLAMA_API_BASE,
    OPENAI_API_BASE,
};
pub use coordinator::{
    AgentOutcome, ConversationMessage, ToolCallRecord, ToolCallingConfig, ToolCoordinator,
};
