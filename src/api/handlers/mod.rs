//! API request handlers.

/// Question answering.
pub mod ask;
/// Liveness and session status.
pub mod health;
/// Document upload and indexing.
pub mod upload;
