//! Gallery service — saved drawings with likes and comments.
//!
//! DESIGN
//! ======
//! Records live in memory for the session, in creation order, and are never
//! removed, so a record's id is also its index. Every write touches exactly
//! one record through `&mut self`; a failed write leaves it untouched.

#[cfg(test)]
#[path = "gallery_test.rs"]
mod gallery_test;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::notice::{E_NOT_FOUND, E_REJECTED, ErrorCode};

// =============================================================================
// TYPES
// =============================================================================

pub type DrawingId = usize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("drawing has no content")]
    EmptyContent,
    #[error("comment is empty")]
    EmptyComment,
    #[error("drawing not found: {0}")]
    NotFound(DrawingId),
}

impl ErrorCode for GalleryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyContent | Self::EmptyComment => E_REJECTED,
            Self::NotFound(_) => E_NOT_FOUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl Comment {
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.author, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingRecord {
    pub id: DrawingId,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Vector JSON of the scene at save time; opaque to the gallery.
    pub content: serde_json::Value,
    pub like_count: u64,
    pub comments: Vec<Comment>,
}

impl DrawingRecord {
    /// `author - YYYY-MM-DD HH:MM:SS`, used by the gallery picker.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.author, super::date_time(self.created_at))
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    records: Vec<DrawingRecord>,
}

impl GalleryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the current drawing.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EmptyContent`] when there is nothing to save.
    pub fn save(
        &mut self,
        author: &str,
        content: Option<&serde_json::Value>,
        now: OffsetDateTime,
    ) -> Result<&DrawingRecord, GalleryError> {
        let content = content.filter(|c| !is_blank_content(c)).ok_or(GalleryError::EmptyContent)?;

        let id = self.records.len();
        self.records.push(DrawingRecord {
            id,
            author: author.to_string(),
            created_at: now,
            content: content.clone(),
            like_count: 0,
            comments: Vec::new(),
        });
        info!(id, %author, "drawing saved to gallery");
        Ok(&self.records[id])
    }

    /// Add one like. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::NotFound`] for an unknown id.
    pub fn like(&mut self, id: DrawingId) -> Result<u64, GalleryError> {
        let record = self.records.get_mut(id).ok_or(GalleryError::NotFound(id))?;
        record.like_count += 1;
        Ok(record.like_count)
    }

    /// Append a comment stamped at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::EmptyComment`] for blank text and
    /// [`GalleryError::NotFound`] for an unknown id.
    pub fn comment(
        &mut self,
        id: DrawingId,
        author: &str,
        text: &str,
        now: OffsetDateTime,
    ) -> Result<&Comment, GalleryError> {
        if text.trim().is_empty() {
            return Err(GalleryError::EmptyComment);
        }
        let record = self.records.get_mut(id).ok_or(GalleryError::NotFound(id))?;
        record.comments.push(Comment { author: author.to_string(), text: text.to_string(), at: now });
        Ok(&record.comments[record.comments.len() - 1])
    }

    #[must_use]
    pub fn get(&self, id: DrawingId) -> Option<&DrawingRecord> {
        self.records.get(id)
    }

    /// All records in creation order.
    #[must_use]
    pub fn list(&self) -> &[DrawingRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Null, blank strings, empty containers, and scenes whose `objects` list is
/// empty all count as "nothing drawn".
fn is_blank_content(content: &serde_json::Value) -> bool {
    match content {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => {
            map.is_empty() || map.get("objects").and_then(serde_json::Value::as_array).is_some_and(Vec::is_empty)
        }
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
    }
}
