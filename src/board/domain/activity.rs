//! Append-only activity log: who did what to which board.
//!
//! One entry is recorded for every committed mutation, in the same
//! atomic unit of work as the mutation itself. Entries are never updated
//! or deleted by application logic; they disappear only when their board
//! is deleted.

use super::error::ParseEnumError;
use super::ids::{ActivityId, BoardId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Enumerated mutation kinds recorded in the activity log.
///
/// The set is extensible; callers of
/// [`BoardService::append_log`](crate::board::services::BoardService::append_log)
/// pick the kind that matches the collaborator-side event they are
/// recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// A board was created.
    CreateBoard,
    /// Board fields were updated.
    UpdateBoard,
    /// A board was archived.
    ArchiveBoard,
    /// A board was restored from the archive.
    RestoreBoard,
    /// A column was created.
    CreateColumn,
    /// Column fields were updated.
    UpdateColumn,
    /// A column was moved to a new position.
    MoveColumn,
    /// A column was deleted.
    DeleteColumn,
    /// A task was created.
    CreateTask,
    /// Task fields were updated.
    UpdateTask,
    /// A task was moved within or across columns.
    MoveTask,
    /// A task was deleted.
    DeleteTask,
    /// A task was archived.
    ArchiveTask,
    /// A task was restored from the archive.
    RestoreTask,
    /// A label was created on the board.
    CreateLabel,
    /// A label was deleted from the board.
    DeleteLabel,
    /// A label was attached to a task.
    AttachLabel,
    /// A label was detached from a task.
    DetachLabel,
    /// A comment was added to a task.
    AddComment,
    /// An attachment was recorded on a task.
    AddAttachment,
    /// A member was added to the board.
    AddMember,
    /// A member was removed from the board.
    RemoveMember,
}

impl ActivityAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateBoard => "create_board",
            Self::UpdateBoard => "update_board",
            Self::ArchiveBoard => "archive_board",
            Self::RestoreBoard => "restore_board",
            Self::CreateColumn => "create_column",
            Self::UpdateColumn => "update_column",
            Self::MoveColumn => "move_column",
            Self::DeleteColumn => "delete_column",
            Self::CreateTask => "create_task",
            Self::UpdateTask => "update_task",
            Self::MoveTask => "move_task",
            Self::DeleteTask => "delete_task",
            Self::ArchiveTask => "archive_task",
            Self::RestoreTask => "restore_task",
            Self::CreateLabel => "create_label",
            Self::DeleteLabel => "delete_label",
            Self::AttachLabel => "attach_label",
            Self::DetachLabel => "detach_label",
            Self::AddComment => "add_comment",
            Self::AddAttachment => "add_attachment",
            Self::AddMember => "add_member",
            Self::RemoveMember => "remove_member",
        }
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "create_board" => Ok(Self::CreateBoard),
            "update_board" => Ok(Self::UpdateBoard),
            "archive_board" => Ok(Self::ArchiveBoard),
            "restore_board" => Ok(Self::RestoreBoard),
            "create_column" => Ok(Self::CreateColumn),
            "update_column" => Ok(Self::UpdateColumn),
            "move_column" => Ok(Self::MoveColumn),
            "delete_column" => Ok(Self::DeleteColumn),
            "create_task" => Ok(Self::CreateTask),
            "update_task" => Ok(Self::UpdateTask),
            "move_task" => Ok(Self::MoveTask),
            "delete_task" => Ok(Self::DeleteTask),
            "archive_task" => Ok(Self::ArchiveTask),
            "restore_task" => Ok(Self::RestoreTask),
            "create_label" => Ok(Self::CreateLabel),
            "delete_label" => Ok(Self::DeleteLabel),
            "attach_label" => Ok(Self::AttachLabel),
            "detach_label" => Ok(Self::DetachLabel),
            "add_comment" => Ok(Self::AddComment),
            "add_attachment" => Ok(Self::AddAttachment),
            "add_member" => Ok(Self::AddMember),
            "remove_member" => Ok(Self::RemoveMember),
            _ => Err(ParseEnumError {
                kind: "activity action",
                value: value.to_owned(),
            }),
        }
    }
}

/// Structured detail payload for an activity entry.
///
/// An opaque key/value map whose shape depends on the action kind. The
/// log does not validate it; callers fill in what their action needs.
///
/// # Examples
///
/// ```
/// use corkboard::board::domain::ActivityDetails;
/// use serde_json::json;
///
/// let details = ActivityDetails::new()
///     .with("task_title", json!("Fix flaky test"))
///     .with("from_position", json!(2));
/// assert_eq!(details.as_map().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityDetails(Map<String, Value>);

impl ActivityDetails {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one key/value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the payload, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ActivityDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One immutable record in a board's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    id: ActivityId,
    board: BoardId,
    actor: Option<UserId>,
    action: ActivityAction,
    details: ActivityDetails,
    created_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Records a new entry.
    ///
    /// `actor` is a weak reference: `None` means the acting user has been
    /// deleted or the event is system-originated.
    #[must_use]
    pub fn record(
        actor: Option<UserId>,
        board: BoardId,
        action: ActivityAction,
        details: ActivityDetails,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            board,
            actor,
            action,
            details,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ActivityId,
        board: BoardId,
        actor: Option<UserId>,
        action: ActivityAction,
        details: ActivityDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            board,
            actor,
            action,
            details,
            created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the board this entry belongs to.
    #[must_use]
    pub const fn board(&self) -> BoardId {
        self.board
    }

    /// Returns the acting user, if still known.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns the action kind.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the structured detail payload.
    #[must_use]
    pub const fn details(&self) -> &ActivityDetails {
        &self.details
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
