//! Board aggregate root: the consistency boundary for position data.
//!
//! All columns, tasks, and labels of a board live inside one aggregate.
//! Every mutation here either returns `Ok` with the density invariants
//! fully restored, or returns an error having changed nothing that a
//! caller committing the aggregate could observe. Services persist the
//! whole aggregate atomically, so concurrent mutations of the same board
//! serialize against each other at the store.

use super::column::Column;
use super::comment::{Attachment, Comment};
use super::error::{BoardDomainError, NotFoundError, ValidationError};
use super::ids::{BoardId, ColumnId, LabelId, TaskId, UserId};
use super::label::Label;
use super::position::{
    Positioned, append_position, check_insertion, close_gap, open_gap, reorder_within,
};
use super::task::{Task, TaskDraft, TaskPatch};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Default board background colour.
pub const DEFAULT_BOARD_COLOR: &str = "#0079bf";

/// Outcome of a committed column move, captured for the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMove {
    /// Moved column.
    pub column: ColumnId,
    /// Column title at move time.
    pub title: String,
    /// Position before the move.
    pub from: usize,
    /// Position after the move.
    pub to: usize,
}

/// Outcome of a committed task move, captured for the activity log.
///
/// For in-column moves the source and destination columns are the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMove {
    /// Moved task.
    pub task: TaskId,
    /// Task title at move time.
    pub title: String,
    /// Column the task left.
    pub from_column: ColumnId,
    /// Title of the source column.
    pub from_column_title: String,
    /// Column the task entered.
    pub to_column: ColumnId,
    /// Title of the destination column.
    pub to_column_title: String,
    /// Position before the move.
    pub from: usize,
    /// Position after the move.
    pub to: usize,
}

/// A kanban board: owner, members, labels, and ordered columns of
/// ordered tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    title: String,
    description: Option<String>,
    owner: UserId,
    members: Vec<UserId>,
    background_color: String,
    is_archived: bool,
    columns: Vec<Column>,
    labels: Vec<Label>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates an empty board owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBoardTitle`] when the title is
    /// empty after trimming.
    pub fn new(
        title: impl Into<String>,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyBoardTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: BoardId::new(),
            title: trimmed,
            description: None,
            owner,
            members: Vec::new(),
            background_color: DEFAULT_BOARD_COLOR.to_owned(),
            is_archived: false,
            columns: Vec::new(),
            labels: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the description at creation time.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the background colour at creation time.
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the board title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the member list (never containing the owner).
    #[must_use]
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Returns true when `user` is the owner or a member.
    #[must_use]
    pub fn is_accessible_by(&self, user: UserId) -> bool {
        self.owner == user || self.members.contains(&user)
    }

    /// Returns the background colour.
    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Returns true when the board is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.is_archived
    }

    /// Returns the columns in storage order (not position order).
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the columns sorted by position.
    #[must_use]
    pub fn columns_ordered(&self) -> Vec<&Column> {
        let mut ordered: Vec<&Column> = self.columns.iter().collect();
        ordered.sort_by_key(|column| column.position());
        ordered
    }

    /// Returns the labels defined on this board.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
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

    /// Looks up a column.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id() == id)
    }

    /// Looks up a task anywhere on the board.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks().iter())
            .find(|task| task.id() == id)
    }

    /// Returns the column currently holding the given task.
    #[must_use]
    pub fn column_of_task(&self, id: TaskId) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.tasks().iter().any(|task| task.id() == id))
    }

    /// Looks up a label.
    #[must_use]
    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|label| label.id() == id)
    }

    /// Renames the board.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBoardTitle`] when the new title is
    /// empty after trimming.
    pub fn rename(
        &mut self,
        title: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), ValidationError> {
        let trimmed = title.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyBoardTitle);
        }
        self.title = trimmed;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the description (`None` clears it).
    pub fn set_description(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Changes the background colour.
    pub fn set_background_color(&mut self, color: impl Into<String>, clock: &impl Clock) {
        self.background_color = color.into();
        self.touch(clock);
    }

    /// Archives the board.
    pub fn archive(&mut self, clock: &impl Clock) {
        self.is_archived = true;
        self.touch(clock);
    }

    /// Restores the board from the archive.
    pub fn restore(&mut self, clock: &impl Clock) {
        self.is_archived = false;
        self.touch(clock);
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OwnerAsMember`] when `user` owns the
    /// board, or [`ValidationError::DuplicateMember`] when already listed.
    pub fn add_member(&mut self, user: UserId, clock: &impl Clock) -> Result<(), ValidationError> {
        if user == self.owner {
            return Err(ValidationError::OwnerAsMember(user));
        }
        if self.members.contains(&user) {
            return Err(ValidationError::DuplicateMember(user));
        }
        self.members.push(user);
        self.touch(clock);
        Ok(())
    }

    /// Removes a member.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MemberNotPresent`] when `user` is not a
    /// member.
    pub fn remove_member(
        &mut self,
        user: UserId,
        clock: &impl Clock,
    ) -> Result<(), ValidationError> {
        let before = self.members.len();
        self.members.retain(|member| *member != user);
        if self.members.len() == before {
            return Err(ValidationError::MemberNotPresent(user));
        }
        self.touch(clock);
        Ok(())
    }

    /// Clears every weak reference to a deleted user: membership and task
    /// assignments. Creator and actor references are kept; creators are
    /// an exclusive lifecycle tie handled by the caller deleting the
    /// board, and log actors are already nullable at read time.
    pub fn detach_user(&mut self, user: UserId, clock: &impl Clock) {
        self.members.retain(|member| *member != user);
        for column in &mut self.columns {
            for task in column.tasks_mut() {
                task.clear_assignee_of(user);
            }
        }
        self.touch(clock);
    }

    /// Creates a column appended at the end of the board and returns a
    /// snapshot of it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyColumnTitle`] when the title is
    /// empty after trimming.
    pub fn add_column(
        &mut self,
        title: impl Into<String>,
        color: Option<String>,
        clock: &impl Clock,
    ) -> Result<Column, ValidationError> {
        let position = append_position(&self.columns);
        let column = Column::new(title, color, position, clock)?;
        self.columns.push(column.clone());
        self.touch(clock);
        Ok(column)
    }

    /// Updates a column's title and/or colour.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Column`] when the column is missing, or a
    /// validation error for an empty replacement title.
    pub fn update_column(
        &mut self,
        id: ColumnId,
        title: Option<String>,
        color: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        let column = self
            .columns
            .iter_mut()
            .find(|column| column.id() == id)
            .ok_or(NotFoundError::Column(id))?;
        if let Some(new_title) = title {
            column.rename(new_title, clock)?;
        }
        if let Some(new_color) = color {
            column.recolor(new_color, clock);
        }
        self.touch(clock);
        Ok(())
    }

    /// Deletes a column, cascading to its tasks and compacting sibling
    /// positions, and returns the removed column.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Column`] when the column is missing.
    pub fn delete_column(
        &mut self,
        id: ColumnId,
        clock: &impl Clock,
    ) -> Result<Column, NotFoundError> {
        let index = self
            .columns
            .iter()
            .position(|column| column.id() == id)
            .ok_or(NotFoundError::Column(id))?;
        let removed = self.columns.remove(index);
        close_gap(&mut self.columns, removed.position());
        self.touch(clock);
        Ok(removed)
    }

    /// Moves a column to a new position among its siblings.
    ///
    /// A move to the current position is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Column`] when the column is missing, or
    /// [`ValidationError::Position`] when the target is out of bounds; no
    /// position changes on error.
    pub fn move_column(
        &mut self,
        id: ColumnId,
        target: usize,
        clock: &impl Clock,
    ) -> Result<ColumnMove, BoardDomainError> {
        let (from, title) = self
            .columns
            .iter()
            .find(|column| column.id() == id)
            .map(|column| (column.position(), column.title().to_owned()))
            .ok_or(NotFoundError::Column(id))?;
        reorder_within(&mut self.columns, from, target).map_err(ValidationError::Position)?;
        self.touch(clock);
        Ok(ColumnMove {
            column: id,
            title,
            from,
            to: target,
        })
    }

    /// Creates a task appended at the end of the given column and
    /// returns a snapshot of it.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Column`] when the column is missing, or a
    /// validation error for an empty title.
    pub fn add_task(
        &mut self,
        column_id: ColumnId,
        draft: TaskDraft,
        creator: UserId,
        clock: &impl Clock,
    ) -> Result<Task, BoardDomainError> {
        let column = self
            .columns
            .iter_mut()
            .find(|column| column.id() == column_id)
            .ok_or(NotFoundError::Column(column_id))?;
        let position = append_position(column.tasks());
        let task = Task::new(draft, creator, position, clock)
            .map_err(BoardDomainError::Validation)?;
        column.tasks_mut().push(task.clone());
        column.touch(clock);
        self.touch(clock);
        Ok(task)
    }

    /// Applies a partial update to a task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing, or a
    /// validation error from the patch; nothing changes on error.
    pub fn update_task(
        &mut self,
        id: TaskId,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        let task = self
            .task_mut(id)
            .ok_or(NotFoundError::Task(id))?;
        task.apply_patch(patch, clock)
            .map_err(BoardDomainError::Validation)?;
        self.touch(clock);
        Ok(())
    }

    /// Deletes a task, cascading to its comments, attachments, and label
    /// links, compacting sibling positions, and returns the removed task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing.
    pub fn delete_task(&mut self, id: TaskId, clock: &impl Clock) -> Result<Task, NotFoundError> {
        let (column_index, task_index) = self.locate_task(id).ok_or(NotFoundError::Task(id))?;
        let column = self
            .columns
            .get_mut(column_index)
            .ok_or(NotFoundError::Task(id))?;
        let removed = column.tasks_mut().remove(task_index);
        close_gap(column.tasks_mut(), removed.position());
        column.touch(clock);
        self.touch(clock);
        Ok(removed)
    }

    /// Archives a task and returns its title for logging.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing.
    pub fn archive_task(&mut self, id: TaskId, clock: &impl Clock) -> Result<String, NotFoundError> {
        let task = self.task_mut(id).ok_or(NotFoundError::Task(id))?;
        task.archive(clock);
        let title = task.title().to_owned();
        self.touch(clock);
        Ok(title)
    }

    /// Restores a task from the archive and returns its title.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing.
    pub fn restore_task(&mut self, id: TaskId, clock: &impl Clock) -> Result<String, NotFoundError> {
        let task = self.task_mut(id).ok_or(NotFoundError::Task(id))?;
        task.restore(clock);
        let title = task.title().to_owned();
        self.touch(clock);
        Ok(title)
    }

    /// Moves a task within its column or into another column.
    ///
    /// Every precondition is checked before any write: the destination
    /// column must exist and the target must be a valid index (same
    /// column) or insertion index (cross column). The gap close in the
    /// source and the gap open in the destination happen inside this one
    /// aggregate mutation, so a committed aggregate can never show one
    /// without the other.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`]/[`NotFoundError::Column`] for
    /// missing references and [`ValidationError::Position`] for invalid
    /// targets; no position changes on error.
    pub fn move_task(
        &mut self,
        id: TaskId,
        destination: ColumnId,
        target: usize,
        clock: &impl Clock,
    ) -> Result<TaskMove, BoardDomainError> {
        let (source_index, task_index) = self.locate_task(id).ok_or(NotFoundError::Task(id))?;
        let destination_index = self
            .columns
            .iter()
            .position(|column| column.id() == destination)
            .ok_or(NotFoundError::Column(destination))?;

        let (title, from) = self
            .columns
            .get(source_index)
            .and_then(|column| column.tasks().get(task_index))
            .map(|task| (task.title().to_owned(), task.position()))
            .ok_or(NotFoundError::Task(id))?;
        let (from_column, from_column_title) = self
            .columns
            .get(source_index)
            .map(|column| (column.id(), column.title().to_owned()))
            .ok_or(NotFoundError::Task(id))?;

        if source_index == destination_index {
            let column = self
                .columns
                .get_mut(source_index)
                .ok_or(NotFoundError::Column(destination))?;
            reorder_within(column.tasks_mut(), from, target)
                .map_err(ValidationError::Position)?;
            column.touch(clock);
            self.touch(clock);
            return Ok(TaskMove {
                task: id,
                title,
                from_column,
                from_column_title: from_column_title.clone(),
                to_column: from_column,
                to_column_title: from_column_title,
                from,
                to: target,
            });
        }

        let (to_column_title, destination_len) = self
            .columns
            .get(destination_index)
            .map(|column| (column.title().to_owned(), column.tasks().len()))
            .ok_or(NotFoundError::Column(destination))?;
        check_insertion(target, destination_len).map_err(ValidationError::Position)?;

        let source = self
            .columns
            .get_mut(source_index)
            .ok_or(NotFoundError::Task(id))?;
        let mut task = source.tasks_mut().remove(task_index);
        close_gap(source.tasks_mut(), from);
        source.touch(clock);

        task.set_position(target);
        let destination_column = self
            .columns
            .get_mut(destination_index)
            .ok_or(NotFoundError::Column(destination))?;
        open_gap(destination_column.tasks_mut(), target);
        destination_column.tasks_mut().push(task);
        destination_column.touch(clock);
        self.touch(clock);

        Ok(TaskMove {
            task: id,
            title,
            from_column,
            from_column_title,
            to_column: destination,
            to_column_title,
            from,
            to: target,
        })
    }

    /// Creates a label on the board.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateLabelName`] when the name is
    /// already used on this board, or an empty-name validation error.
    pub fn add_label(
        &mut self,
        name: impl Into<String>,
        color: Option<String>,
        clock: &impl Clock,
    ) -> Result<Label, ValidationError> {
        let label = Label::new(name, color)?;
        if self
            .labels
            .iter()
            .any(|existing| existing.name() == label.name())
        {
            return Err(ValidationError::DuplicateLabelName(label.name().to_owned()));
        }
        self.labels.push(label.clone());
        self.touch(clock);
        Ok(label)
    }

    /// Deletes a label, unlinking it from every task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Label`] when the label is missing.
    pub fn delete_label(&mut self, id: LabelId, clock: &impl Clock) -> Result<Label, NotFoundError> {
        let index = self
            .labels
            .iter()
            .position(|label| label.id() == id)
            .ok_or(NotFoundError::Label(id))?;
        let removed = self.labels.remove(index);
        for column in &mut self.columns {
            for task in column.tasks_mut() {
                task.unlink_label(id);
            }
        }
        self.touch(clock);
        Ok(removed)
    }

    /// Attaches a board label to a task.
    ///
    /// The label and task belong to the same board by construction, so a
    /// cross-board link cannot be expressed.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for a missing task or label, or
    /// [`ValidationError::DuplicateTaskLabel`] for a repeated attach.
    pub fn attach_label(
        &mut self,
        task_id: TaskId,
        label_id: LabelId,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        if self.label(label_id).is_none() {
            return Err(NotFoundError::Label(label_id).into());
        }
        let task = self.task_mut(task_id).ok_or(NotFoundError::Task(task_id))?;
        task.attach_label(label_id, clock)
            .map_err(BoardDomainError::Validation)?;
        self.touch(clock);
        Ok(())
    }

    /// Detaches a board label from a task.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for a missing task or label, or
    /// [`ValidationError::LabelNotAttached`] when the link does not exist.
    pub fn detach_label(
        &mut self,
        task_id: TaskId,
        label_id: LabelId,
        clock: &impl Clock,
    ) -> Result<(), BoardDomainError> {
        if self.label(label_id).is_none() {
            return Err(NotFoundError::Label(label_id).into());
        }
        let task = self.task_mut(task_id).ok_or(NotFoundError::Task(task_id))?;
        task.detach_label(label_id, clock)
            .map_err(BoardDomainError::Validation)?;
        self.touch(clock);
        Ok(())
    }

    /// Adds a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing.
    pub fn add_comment(
        &mut self,
        task_id: TaskId,
        comment: Comment,
        clock: &impl Clock,
    ) -> Result<(), NotFoundError> {
        let task = self.task_mut(task_id).ok_or(NotFoundError::Task(task_id))?;
        task.add_comment(comment);
        self.touch(clock);
        Ok(())
    }

    /// Records an attachment on a task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task is missing.
    pub fn add_attachment(
        &mut self,
        task_id: TaskId,
        attachment: Attachment,
        clock: &impl Clock,
    ) -> Result<(), NotFoundError> {
        let task = self.task_mut(task_id).ok_or(NotFoundError::Task(task_id))?;
        task.add_attachment(attachment);
        self.touch(clock);
        Ok(())
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|column| column.tasks_mut().iter_mut())
            .find(|task| task.id() == id)
    }

    fn locate_task(&self, id: TaskId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(column_index, column)| {
            column
                .tasks()
                .iter()
                .position(|task| task.id() == id)
                .map(|task_index| (column_index, task_index))
        })
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
