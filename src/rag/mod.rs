//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! Turns one uploaded document into something an agent can search.
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Overlapping, boundary-aware text chunks
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding providers (OpenAI-compatible, fastembed)
//! - [`rag::distance`](crate::rag::distance) - Cosine and Euclidean similarity
//! - [`rag::index`](crate::rag::index) - In-memory, build-once embedding index
//! - [`rag::retriever`](crate::rag::retriever) - Fixed-k retrieval exposed as an agent tool
//!
//! # Pipeline
//!
//! 1. **Chunking** - raw text is split into overlapping chunks
//! 2. **Indexing** - every chunk is embedded; the index exists only if all succeed
//! 3. **Retrieval** - the query is embedded and the nearest chunks are returned
//! 4. **Generation** - the answering agent reads the retrieved text through a tool call
//!
//! # Example
//!
//! ```ignore
//! use docchat::rag::{chunker::TextChunker, index::{DocumentIndex, IndexOptions}, retriever::Retriever};
//!
//! let chunks = TextChunker::new(1000, 150)?.chunk(&document_text);
//! let index = DocumentIndex::build(chunks, provider, IndexOptions::default()).await?;
//! let context = Retriever::new(Arc::new(index)).retrieve("quarterly revenue").await?;
//! ```

pub mod chunker;
pub mod distance;
pub mod embeddings;
pub mod index;
pub mod retriever;
