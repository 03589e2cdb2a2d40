//! Comments and attachment bookkeeping records owned by tasks.
//!
//! Both live and die with their task. Attachment records track upload
//! metadata only; the stored bytes belong to the file-storage
//! collaborator.

use super::error::ValidationError;
use super::ids::{AttachmentId, CommentId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user comment on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    author: UserId,
    text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment with trimmed, non-empty text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCommentText`] when the text is
    /// empty after trimming.
    pub fn new(
        author: UserId,
        text: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        let trimmed = text.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCommentText);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: CommentId::new(),
            author,
            text: trimmed,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the comment author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the comment text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Upload bookkeeping for a file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    id: AttachmentId,
    file_name: String,
    file_size: u64,
    uploaded_by: UserId,
    uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Records an upload.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        file_size: u64,
        uploaded_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AttachmentId::new(),
            file_name: file_name.into(),
            file_size,
            uploaded_by,
            uploaded_at: clock.utc(),
        }
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub const fn id(&self) -> AttachmentId {
        self.id
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub const fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Returns the uploading user.
    #[must_use]
    pub const fn uploaded_by(&self) -> UserId {
        self.uploaded_by
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}
