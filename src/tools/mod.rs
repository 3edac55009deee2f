//! Tools agents can call during the tool-calling loop.
//!
//! - [`registry`](crate::tools::registry) - the [`Tool`](registry::Tool) trait and tool lookup
//!
//! The document retriever is the only tool shipped today; it lives in
//! [`rag::retriever`](crate::rag::retriever) next to the index it searches.

/// Tool registry for managing available tools.
pub mod registry;

pub use registry::{Tool, ToolRegistry};
