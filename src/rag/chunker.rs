//! Text chunking for document ingestion.
//!
//! Chunks are windows of at most `chunk_size` characters. Consecutive chunks
//! share up to `chunk_overlap` characters. Splits prefer the largest natural
//! boundary that fits (paragraph, line, sentence, word) and only fall back to
//! a hard character cut when a single unit is larger than a chunk.
//!
//! Whitespace is preserved, so stripping the overlap regions and joining the
//! chunks reproduces the source text byte for byte.

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// An immutable slice of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Position of the chunk in document order.
    pub index: usize,
    pub content: String,
    /// Byte offset of the first byte in the source text.
    pub start_offset: usize,
    /// Byte offset one past the last byte in the source text.
    pub end_offset: usize,
}

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    splitter: TextSplitter<Characters>,
}

impl TextChunker {
    /// Fails with [`AppError::InvalidParameters`] unless `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(AppError::InvalidParameters(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::InvalidParameters(e.to_string()))?
            .with_trim(false);

        Ok(Self {
            chunk_size,
            chunk_overlap,
            splitter: TextSplitter::new(config),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into ordered chunks. Empty input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<DocumentChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        self.splitter
            .chunk_indices(text)
            .enumerate()
            .map(|(index, (offset, content))| DocumentChunk {
                index,
                content: content.to_string(),
                start_offset: offset,
                end_offset: offset + content.len(),
            })
            .collect()
    }
}

/// One-shot chunking with explicit parameters.
pub fn chunk(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<DocumentChunk>> {
    Ok(TextChunker::new(chunk_size, chunk_overlap)?.chunk(text))
}

/// Rebuild the source text from chunks by dropping each chunk's overlap with
/// its predecessor.
pub fn reassemble(chunks: &[DocumentChunk]) -> String {
    let mut text = String::new();
    let mut covered = 0usize;

    for chunk in chunks {
        if chunk.end_offset <= covered {
            continue;
        }
        let skip = covered.saturating_sub(chunk.start_offset);
        text.push_str(&chunk.content[skip..]);
        covered = chunk.end_offset;
    }

    text
}
