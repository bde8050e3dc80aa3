//! Chat service — append-only message log backed by SQLite.
//!
//! DESIGN
//! ======
//! Appends are awaited to completion before the caller moves on, so a
//! `list_all` issued afterwards in the same cycle always sees the new row.
//! Ids come from `AUTOINCREMENT`, which stays strictly increasing even when
//! other processes write to the same file.
//!
//! ERROR HANDLING
//! ==============
//! Blank authors or bodies are rejected before touching the store. Store
//! failures surface as `ChatError::Persistence`; the orchestrator keeps the
//! last good listing so the panel stays usable.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::notice::{E_PERSISTENCE, E_REJECTED, ErrorCode};

// =============================================================================
// TYPES
// =============================================================================

pub type MessageId = i64;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("enter your name before sending")]
    EmptyAuthor,
    #[error("message is empty")]
    EmptyBody,
    #[error("chat store unavailable: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyAuthor | Self::EmptyBody => E_REJECTED,
            Self::Persistence(_) => E_PERSISTENCE,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// A persisted chat message. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl ChatMessage {
    /// `[HH:MM:SS] author: body`
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("[{}] {}: {}", super::clock_time(self.sent_at), self.author, self.body)
    }
}

// =============================================================================
// MESSAGE LOG
// =============================================================================

#[derive(Debug, Clone)]
pub struct MessageLog {
    pool: SqlitePool,
}

impl MessageLog {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message stamped with `sent_at`.
    ///
    /// # Errors
    ///
    /// Returns a rejection for a blank author or body, or a persistence
    /// error if the insert fails.
    pub async fn append(&self, author: &str, body: &str, sent_at: OffsetDateTime) -> Result<MessageId, ChatError> {
        if author.trim().is_empty() {
            return Err(ChatError::EmptyAuthor);
        }
        if body.trim().is_empty() {
            return Err(ChatError::EmptyBody);
        }

        let result = sqlx::query("INSERT INTO chat_messages (author, body, sent_at) VALUES (?1, ?2, ?3)")
            .bind(author)
            .bind(body)
            .bind(sent_at)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(id, %author, "chat message appended");
        Ok(id)
    }

    /// Every stored message, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ChatMessage>, ChatError> {
        let rows = sqlx::query_as::<_, (i64, String, String, OffsetDateTime)>(
            "SELECT id, author, body, sent_at FROM chat_messages ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, author, body, sent_at)| ChatMessage { id, author, body, sent_at })
            .collect())
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
