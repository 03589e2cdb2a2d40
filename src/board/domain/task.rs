//! Task cards and related value types.

use super::comment::{Attachment, Comment};
use super::error::{ParseEnumError, ValidationError};
use super::ids::{LabelId, TaskId, UserId};
use super::position::Positioned;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task urgency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Ordinary work.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                kind: "priority",
                value: value.to_owned(),
            }),
        }
    }
}

/// Input for creating a task card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
    assignee: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
    priority: Priority,
}

impl TaskDraft {
    /// Creates a draft with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            assignee: None,
            due_date: None,
            priority: Priority::default(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial update applied to a task.
///
/// `None` means "leave the field alone"; the inner `Option` on clearable
/// fields distinguishes "set" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// Replacement assignee (`Some(None)` unassigns).
    pub assignee: Option<Option<UserId>>,
    /// Replacement due date (`Some(None)` clears it).
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement priority.
    pub priority: Option<Priority>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}

/// A task card within a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    assignee: Option<UserId>,
    creator: UserId,
    due_date: Option<DateTime<Utc>>,
    priority: Priority,
    position: usize,
    is_archived: bool,
    labels: Vec<LabelId>,
    comments: Vec<Comment>,
    attachments: Vec<Attachment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task at the given (allocator-assigned) position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTaskTitle`] when the draft title is
    /// empty after trimming.
    pub fn new(
        draft: TaskDraft,
        creator: UserId,
        position: usize,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(ValidationError::EmptyTaskTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title,
            description: draft.description,
            assignee: draft.assignee,
            creator,
            due_date: draft.due_date,
            priority: draft.priority,
            position,
            is_archived: false,
            labels: Vec::new(),
            comments: Vec::new(),
            attachments: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.creator
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns true when the task is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.is_archived
    }

    /// Returns the attached label identifiers.
    #[must_use]
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }

    /// Returns the comments, oldest first.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns the attachment records.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTaskTitle`] when the patch carries
    /// an empty replacement title; nothing is changed on error.
    pub fn apply_patch(&mut self, patch: TaskPatch, clock: &impl Clock) -> Result<(), ValidationError> {
        let replacement_title = match patch.title {
            Some(raw) => {
                let trimmed = raw.trim().to_owned();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyTaskTitle);
                }
                Some(trimmed)
            }
            None => None,
        };
        if let Some(title) = replacement_title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.touch(clock);
        Ok(())
    }

    /// Clears the assignee when it references the given user.
    ///
    /// Weak-reference semantics: the assignee field clears when its user
    /// is deleted, rather than cascading into the task.
    pub fn clear_assignee_of(&mut self, user: UserId) {
        if self.assignee == Some(user) {
            self.assignee = None;
        }
    }

    /// Marks the task archived.
    pub fn archive(&mut self, clock: &impl Clock) {
        self.is_archived = true;
        self.touch(clock);
    }

    /// Restores the task from the archive.
    pub fn restore(&mut self, clock: &impl Clock) {
        self.is_archived = false;
        self.touch(clock);
    }

    /// Attaches a label.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateTaskLabel`] when the label is
    /// already attached.
    pub fn attach_label(&mut self, label: LabelId, clock: &impl Clock) -> Result<(), ValidationError> {
        if self.labels.contains(&label) {
            return Err(ValidationError::DuplicateTaskLabel {
                task: self.id,
                label,
            });
        }
        self.labels.push(label);
        self.touch(clock);
        Ok(())
    }

    /// Detaches a label.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LabelNotAttached`] when the label is not
    /// attached.
    pub fn detach_label(&mut self, label: LabelId, clock: &impl Clock) -> Result<(), ValidationError> {
        let before = self.labels.len();
        self.labels.retain(|attached| *attached != label);
        if self.labels.len() == before {
            return Err(ValidationError::LabelNotAttached {
                task: self.id,
                label,
            });
        }
        self.touch(clock);
        Ok(())
    }

    /// Removes every link to the given label (used when the label itself
    /// is deleted from the board).
    pub fn unlink_label(&mut self, label: LabelId) {
        self.labels.retain(|attached| *attached != label);
    }

    /// Appends a comment.
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Appends an attachment record.
    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

impl Positioned for Task {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}
