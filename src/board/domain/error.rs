//! Error types for board domain validation and lookup.

use super::ids::{BoardId, ColumnId, LabelId, TaskId, UserId};
use super::position::PositionError;
use thiserror::Error;

/// A referenced entity does not exist.
///
/// Lookup failures never leave partial mutations behind: aggregate
/// operations resolve every referenced child before writing anything.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// The board does not exist.
    #[error("board not found: {0}")]
    Board(BoardId),

    /// The column does not exist on this board.
    #[error("column not found: {0}")]
    Column(ColumnId),

    /// The task does not exist on this board.
    #[error("task not found: {0}")]
    Task(TaskId),

    /// The label does not exist on this board.
    #[error("label not found: {0}")]
    Label(LabelId),
}

/// Input rejected by domain validation; no mutation was applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The board title is empty after trimming.
    #[error("board title must not be empty")]
    EmptyBoardTitle,

    /// The column title is empty after trimming.
    #[error("column title must not be empty")]
    EmptyColumnTitle,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The label name is empty after trimming.
    #[error("label name must not be empty")]
    EmptyLabelName,

    /// The comment text is empty after trimming.
    #[error("comment text must not be empty")]
    EmptyCommentText,

    /// A label with this name already exists on the board.
    #[error("label name '{0}' already used on this board")]
    DuplicateLabelName(String),

    /// The label is already attached to the task.
    #[error("label {label} already attached to task {task}")]
    DuplicateTaskLabel {
        /// Task carrying the duplicate link.
        task: TaskId,
        /// Label being attached a second time.
        label: LabelId,
    },

    /// The label is not attached to the task.
    #[error("label {label} is not attached to task {task}")]
    LabelNotAttached {
        /// Task the detach was aimed at.
        task: TaskId,
        /// Label that is not attached.
        label: LabelId,
    },

    /// The board owner cannot also be listed as a member.
    #[error("user {0} owns the board and cannot be added as a member")]
    OwnerAsMember(UserId),

    /// The user is already a member of the board.
    #[error("user {0} is already a member of the board")]
    DuplicateMember(UserId),

    /// The user is not a member of the board.
    #[error("user {0} is not a member of the board")]
    MemberNotPresent(UserId),

    /// A move target position was rejected.
    #[error(transparent)]
    Position(#[from] PositionError),
}

/// Errors returned by board aggregate operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// A referenced child entity is missing.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Domain validation rejected the input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<PositionError> for BoardDomainError {
    fn from(err: PositionError) -> Self {
        Self::Validation(ValidationError::Position(err))
    }
}

/// Error returned while parsing enumerated values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enumeration failed to parse.
    pub kind: &'static str,
    /// The rejected raw value.
    pub value: String,
}
