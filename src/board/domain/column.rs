//! Columns: ordered task containers within a board.

use super::error::ValidationError;
use super::ids::ColumnId;
use super::position::Positioned;
use super::task::Task;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Default column colour.
pub const DEFAULT_COLUMN_COLOR: &str = "#ebecf0";

/// An ordered list of tasks within a board.
///
/// The column's own `position` is dense within its board; its tasks'
/// positions are dense within the column. Both are maintained solely by
/// the reorder engine via the owning [`Board`](super::Board).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    title: String,
    color: String,
    position: usize,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Column {
    /// Creates a column at the given (allocator-assigned) position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyColumnTitle`] when the title is
    /// empty after trimming.
    pub fn new(
        title: impl Into<String>,
        color: Option<String>,
        position: usize,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyColumnTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ColumnId::new(),
            title: trimmed,
            color: color.unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_owned()),
            position,
            tasks: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the column title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the column colour.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns the tasks in storage order (not position order).
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the tasks sorted by position.
    #[must_use]
    pub fn tasks_ordered(&self) -> Vec<&Task> {
        let mut ordered: Vec<&Task> = self.tasks.iter().collect();
        ordered.sort_by_key(|task| task.position());
        ordered
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

    /// Renames the column.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyColumnTitle`] when the new title is
    /// empty after trimming.
    pub fn rename(&mut self, title: impl Into<String>, clock: &impl Clock) -> Result<(), ValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyColumnTitle);
        }
        self.title = trimmed;
        self.touch(clock);
        Ok(())
    }

    /// Changes the column colour.
    pub fn recolor(&mut self, color: impl Into<String>, clock: &impl Clock) {
        self.color = color.into();
        self.touch(clock);
    }

    pub(super) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }

    pub(super) fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

impl Positioned for Column {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}
