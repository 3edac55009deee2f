//! # DocChat
//!
//! A conversational question-answering server with two modes: general chat
//! with conversation memory, and agentic question answering over one uploaded
//! document.
//!
//! DocChat can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `docchat-server` binary
//! 2. **As a library** - Embed the pipeline in your own Rust project
//!
//! ## Pipeline
//!
//! ```text
//! text ─▶ TextChunker ─▶ DocumentIndex::build ─▶ Retriever ─▶ DocumentAgent ─▶ answer
//!                                                  (tool)     (tool loop)
//! ```
//!
//! [`SessionRouter`] sends each question to the document agent when a
//! document is active and to the [`GeneralChatSession`](agents::GeneralChatSession)
//! otherwise.
//!
//! ## Example
//!
//! ```rust,ignore
//! use docchat::{AppConfig, SessionRouter};
//!
//! let config = AppConfig::load("docchat.toml")?;
//! let router = SessionRouter::from_config(&config)?;
//!
//! router.upload("report.txt", &std::fs::read_to_string("report.txt")?).await?;
//! let answer = router.route("What was the quarterly revenue?").await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `pdf` | PDF text extraction via `pdf_oxide` (default) |
//! | `local-embeddings` | fastembed ONNX embeddings, no embedding API needed |
//!
//! ## Modules
//!
//! - [`agents`] - Document agent, general chat, session router
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command line parsing, REPL and terminal output
//! - [`ingest`] - File to text extraction
//! - [`llm`] - LLM client and tool-calling loop
//! - [`memory`] - Conversation history
//! - [`rag`] - Chunking, embeddings, index, retriever
//! - [`tools`] - Tool trait and registry
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration

/// Conversational agents and session routing.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command line interface.
pub mod cli;
/// Text extraction for uploaded files.
pub mod ingest;
/// LLM provider clients and abstractions.
pub mod llm;
/// Conversation memory.
pub mod memory;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Agent tools.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::SessionRouter;
pub use llm::{LLMClient, LLMClientFactory, LLMResponse, Provider};
pub use rag::embeddings::EmbeddingProvider;
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::config::AppConfig;

use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<AppConfig>,
    /// Process-wide session (active document + chat history)
    pub router: Arc<SessionRouter>,
}

impl AppState {
    /// Build providers and the session router from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let router = SessionRouter::from_config(&config)?;
        Ok(Self::new(config, router))
    }

    pub fn new(config: AppConfig, router: SessionRouter) -> Self {
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
        }
    }
}

/// The complete HTTP application: routes, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    api::routes::create_router(state.config.server.max_upload_bytes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}
