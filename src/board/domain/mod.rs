//! Domain types for the board bounded context.
//!
//! Pure business logic: the board aggregate, its child entities, the
//! position allocator and reorder engine, and the activity log types.
//! Nothing here touches infrastructure; persistence goes through the
//! port in [`crate::board::ports`].

mod activity;
mod board;
mod column;
mod comment;
mod error;
mod ids;
mod label;
pub mod position;
mod task;

pub use activity::{ActivityAction, ActivityDetails, ActivityEntry};
pub use board::{Board, ColumnMove, DEFAULT_BOARD_COLOR, TaskMove};
pub use column::{Column, DEFAULT_COLUMN_COLOR};
pub use comment::{Attachment, Comment};
pub use error::{BoardDomainError, NotFoundError, ParseEnumError, ValidationError};
pub use ids::{
    ActivityId, AttachmentId, BoardId, ColumnId, CommentId, LabelId, TaskId, UserId,
};
pub use label::{DEFAULT_LABEL_COLOR, Label};
pub use position::{PositionError, Positioned};
pub use task::{Priority, Task, TaskDraft, TaskPatch};
