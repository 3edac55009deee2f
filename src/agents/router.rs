//! Process-wide session state and question dispatch.
//!
//! The router owns at most one active document session plus the general chat
//! session. Uploads build a complete new session off to the side and swap it
//! in atomically; each question loads one snapshot up front, so an answer in
//! flight keeps using the index it started with.
//!
//! Uploads are numbered when they start. When uploads overlap, the one that
//! started last wins: an older upload finishing afterwards is discarded with
//! [`AppError::Superseded`].

use crate::agents::chat::GeneralChatSession;
use crate::agents::document::DocumentAgent;
use crate::agents::Agent;
use crate::llm::{LLMClient, LLMClientFactory};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::{create_embedding_provider, EmbeddingProvider};
use crate::rag::index::{DocumentIndex, IndexOptions};
use crate::rag::retriever::Retriever;
use crate::types::{AppError, DocumentInfo, Result, SessionMode};
use crate::utils::config::{AgentConfig, AppConfig, RagConfig};
use arc_swap::ArcSwapOption;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// An uploaded document ready to answer questions.
pub struct DocumentSession {
    pub info: DocumentInfo,
    pub agent: DocumentAgent,
}

pub struct SessionRouter {
    document: ArcSwapOption<DocumentSession>,
    /// Last sequence number handed to an upload
    upload_seq: AtomicU64,
    /// Sequence number of the newest upload installed or cleared
    installed_seq: Mutex<u64>,
    chat: GeneralChatSession,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    agent_llm: Arc<dyn LLMClient>,
    index_options: IndexOptions,
    rag: RagConfig,
    agent: AgentConfig,
}

impl SessionRouter {
    pub fn new(
        config: &AppConfig,
        agent_llm: Arc<dyn LLMClient>,
        chat_llm: Arc<dyn LLMClient>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;

        Ok(Self {
            document: ArcSwapOption::empty(),
            upload_seq: AtomicU64::new(0),
            installed_seq: Mutex::new(0),
            chat: GeneralChatSession::new(chat_llm, &config.chat),
            chunker,
            embedder,
            agent_llm,
            index_options: IndexOptions {
                batch_size: config.embeddings.batch_size,
                metric: config.embeddings.metric,
            },
            rag: config.rag.clone(),
            agent: config.agent.clone(),
        })
    }

    /// Build providers from configuration and wire up the router.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let factory = LLMClientFactory::new(&config.llm);
        let embedder = create_embedding_provider(&config.embeddings)?;

        tracing::info!(
            provider = factory.provider().name(),
            model = factory.provider().model(),
            embeddings = embedder.model_name(),
            "Session router ready"
        );

        Self::new(
            config,
            factory.agent_client()?,
            factory.chat_client()?,
            embedder,
        )
    }

    /// Answer `query` with the active document, or chat when there is none.
    pub async fn route(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Question must not be empty".to_string()));
        }

        let snapshot = self.document.load_full();
        match snapshot {
            Some(session) => {
                tracing::debug!(document_id = %session.info.document_id, "Routing to document agent");
                session.agent.respond(query).await
            }
            None => {
                tracing::debug!("Routing to general chat");
                self.chat.respond(query).await
            }
        }
    }

    /// Chunk and index `text`, then make it the active document.
    ///
    /// The previous document stays active until the new index is complete;
    /// a failed upload leaves the current session as it was. Conversation
    /// history is not touched. If a later upload is installed first, this one
    /// is dropped and returns [`AppError::Superseded`].
    pub async fn upload(&self, source: &str, text: &str) -> Result<DocumentInfo> {
        let start = Instant::now();
        let seq = self.upload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(AppError::Extraction("no extractable text".to_string()));
        }

        let index = DocumentIndex::build(chunks, self.embedder.clone(), self.index_options).await?;

        let retriever = Retriever::new(Arc::new(index))
            .with_top_k(self.rag.top_k)
            .with_separator(self.rag.separator.clone());
        let chunk_count = retriever.index().len();

        let info = DocumentInfo {
            document_id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            chunk_count,
            created_at: Utc::now(),
        };

        let agent = DocumentAgent::new(self.agent_llm.clone(), Arc::new(retriever), &self.agent);
        {
            let mut installed = self.installed_seq.lock().unwrap_or_else(|e| e.into_inner());
            if *installed >= seq {
                tracing::warn!(source, seq, installed = *installed, "Discarding superseded upload");
                return Err(AppError::Superseded {
                    file: source.to_string(),
                });
            }
            *installed = seq;
            self.document.store(Some(Arc::new(DocumentSession {
                info: info.clone(),
                agent,
            })));
        }

        tracing::info!(
            document_id = %info.document_id,
            source,
            chunks = chunk_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document session activated"
        );

        Ok(info)
    }

    pub fn mode(&self) -> SessionMode {
        if self.document.load().is_some() {
            SessionMode::Document
        } else {
            SessionMode::General
        }
    }

    pub fn active_document(&self) -> Option<DocumentInfo> {
        self.document.load().as_ref().map(|s| s.info.clone())
    }

    /// The active document session, if any, as a consistent snapshot.
    pub fn document_session(&self) -> Option<Arc<DocumentSession>> {
        self.document.load_full()
    }

    /// Return to general chat. Returns whether a document was active.
    ///
    /// Uploads still in progress are superseded by the reset.
    pub fn clear_document(&self) -> bool {
        let mut installed = self.installed_seq.lock().unwrap_or_else(|e| e.into_inner());
        *installed = self.upload_seq.load(Ordering::SeqCst);
        let previous = self.document.swap(None);
        if let Some(session) = &previous {
            tracing::info!(document_id = %session.info.document_id, "Document session cleared");
        }
        previous.is_some()
    }

    pub fn chat(&self) -> &GeneralChatSession {
        &self.chat
    }
}
