//! Client for the puzzle game backend
//!
//! Two endpoints: `/history` loads a session, `/chat` starts a session,
//! asks a question, or reveals the answer.

mod client;
mod error;
pub mod query;
mod types;

pub use client::HttpPuzzleApi;
pub use error::{TransportError, TransportErrorKind};
pub use types::{ChatResponse, DialogEntry, HistoryResponse, Puzzle, Role};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for talking to the game backend
#[async_trait]
pub trait PuzzleApi: Send + Sync {
    /// Load the puzzle and dialog log for a session token
    async fn fetch_chat_history(&self, cid: &str) -> Result<HistoryResponse, TransportError>;

    /// Send one question. An empty question with no `cid` starts a new session.
    async fn fetch_chat(
        &self,
        question: &str,
        cid: Option<&str>,
    ) -> Result<ChatResponse, TransportError>;
}

#[async_trait]
impl<T: PuzzleApi + ?Sized> PuzzleApi for Arc<T> {
    async fn fetch_chat_history(&self, cid: &str) -> Result<HistoryResponse, TransportError> {
        (**self).fetch_chat_history(cid).await
    }

    async fn fetch_chat(
        &self,
        question: &str,
        cid: Option<&str>,
    ) -> Result<ChatResponse, TransportError> {
        (**self).fetch_chat(question, cid).await
    }
}

/// Logging wrapper for API implementations
pub struct LoggingApi {
    inner: Arc<dyn PuzzleApi>,
}

impl LoggingApi {
    pub fn new(inner: Arc<dyn PuzzleApi>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PuzzleApi for LoggingApi {
    async fn fetch_chat_history(&self, cid: &str) -> Result<HistoryResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.fetch_chat_history(cid).await;
        let duration = start.elapsed();

        match &result {
            Ok(history) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    entries = history.discussion.len(),
                    has_puzzle = history.puzzle.is_some(),
                    "History request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "History request failed"
                );
            }
        }

        result
    }

    async fn fetch_chat(
        &self,
        question: &str,
        cid: Option<&str>,
    ) -> Result<ChatResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.fetch_chat(question, cid).await;
        let duration = start.elapsed();

        match &result {
            Ok(chat) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    has_session = cid.is_some(),
                    issued_session = chat.cid.is_some(),
                    reply_len = chat.reply.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    has_session = cid.is_some(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
