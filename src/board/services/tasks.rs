//! Task operations: lifecycle, moves, labels, comments, attachments.

use super::boards::{BoardService, BoardServiceResult};
use crate::board::{
    domain::{
        ActivityAction, ActivityDetails, Attachment, BoardId, Comment, ColumnId, Label, LabelId,
        NotFoundError, Task, TaskDraft, TaskId, TaskMove, TaskPatch, UserId, ValidationError,
        position::checked_target,
    },
    ports::BoardStore,
};
use mockable::Clock;
use serde_json::{Map, Value, json};

/// Builds the `{field: {"old": .., "new": ..}}` change record logged for
/// task updates.
fn change(old: Value, new: Value) -> Value {
    let mut pair = Map::new();
    pair.insert("old".to_owned(), old);
    pair.insert("new".to_owned(), new);
    Value::Object(pair)
}

fn user_value(user: Option<UserId>) -> Value {
    user.map_or(Value::Null, |id| json!(id.to_string()))
}

/// Collects per-field change records for a patch applied to `task`.
fn patch_changes(task: &Task, patch: &TaskPatch) -> Map<String, Value> {
    let mut changes = Map::new();
    if let Some(title) = &patch.title
        && title.trim() != task.title()
    {
        changes.insert(
            "title".to_owned(),
            change(json!(task.title()), json!(title.trim())),
        );
    }
    if let Some(description) = &patch.description
        && description.as_deref() != task.description()
    {
        changes.insert(
            "description".to_owned(),
            change(
                task.description().map_or(Value::Null, |text| json!(text)),
                description.as_deref().map_or(Value::Null, |text| json!(text)),
            ),
        );
    }
    if let Some(assignee) = &patch.assignee
        && *assignee != task.assignee()
    {
        changes.insert(
            "assignee".to_owned(),
            change(user_value(task.assignee()), user_value(*assignee)),
        );
    }
    if let Some(due_date) = &patch.due_date
        && *due_date != task.due_date()
    {
        changes.insert(
            "due_date".to_owned(),
            change(
                task.due_date().map_or(Value::Null, |date| json!(date)),
                due_date.map_or(Value::Null, |date| json!(date)),
            ),
        );
    }
    if let Some(priority) = patch.priority
        && priority != task.priority()
    {
        changes.insert(
            "priority".to_owned(),
            change(json!(task.priority().as_str()), json!(priority.as_str())),
        );
    }
    changes
}

impl<S, C> BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a task at the end of the given column.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn create_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        column_id: ColumnId,
        draft: TaskDraft,
    ) -> BoardServiceResult<Task> {
        self.mutate(board_id, move |board| {
            let task = board.add_task(column_id, draft.clone(), actor, self.clock())?;
            let column_title = board
                .column(column_id)
                .map(|column| column.title().to_owned())
                .ok_or(NotFoundError::Column(column_id))?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::CreateTask,
                ActivityDetails::new()
                    .with("task_id", json!(task.id().to_string()))
                    .with("task_title", json!(task.title()))
                    .with("column", json!(column_title)),
            );
            Ok((task, vec![entry]))
        })
        .await
    }

    /// Applies a partial update to a task, logging old/new values for
    /// each changed field.
    ///
    /// A patch that changes nothing still succeeds but appends no
    /// activity entry.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn update_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> BoardServiceResult<Task> {
        self.mutate(board_id, move |board| {
            let before = board.task(task_id).ok_or(NotFoundError::Task(task_id))?;
            let changes = patch_changes(before, &patch);
            board.update_task(task_id, patch.clone(), self.clock())?;
            let task = board
                .task(task_id)
                .cloned()
                .ok_or(NotFoundError::Task(task_id))?;
            let entries = if changes.is_empty() {
                Vec::new()
            } else {
                vec![self.entry(
                    actor,
                    board_id,
                    ActivityAction::UpdateTask,
                    ActivityDetails::new()
                        .with("task_id", json!(task.id().to_string()))
                        .with("task_title", json!(task.title()))
                        .with("changes", Value::Object(changes)),
                )]
            };
            Ok((task, entries))
        })
        .await
    }

    /// Deletes a task, cascading to its comments, attachments, and label
    /// links, and compacting sibling positions.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn delete_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            let removed = board.delete_task(task_id, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::DeleteTask,
                ActivityDetails::new()
                    .with("task_id", json!(removed.id().to_string()))
                    .with("task_title", json!(removed.title())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Moves a task within its column or into another column.
    ///
    /// `target` is a signed wire value; negatives fail validation before
    /// any mutation. A move to the current position succeeds and still
    /// logs one entry.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn move_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        destination: ColumnId,
        target: i64,
    ) -> BoardServiceResult<TaskMove> {
        let checked = checked_target(target).map_err(ValidationError::from)?;
        self.mutate(board_id, move |board| {
            let outcome = board.move_task(task_id, destination, checked, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::MoveTask,
                ActivityDetails::new()
                    .with("task_id", json!(outcome.task.to_string()))
                    .with("task_title", json!(outcome.title))
                    .with("from_column", json!(outcome.from_column_title))
                    .with("to_column", json!(outcome.to_column_title))
                    .with("from_position", json!(outcome.from))
                    .with("to_position", json!(outcome.to)),
            );
            Ok((outcome, vec![entry]))
        })
        .await
    }

    /// Archives a task.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn archive_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            let title = board.archive_task(task_id, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::ArchiveTask,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("task_title", json!(title)),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Restores a task from the archive.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn restore_task(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            let title = board.restore_task(task_id, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::RestoreTask,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("task_title", json!(title)),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Creates a label on the board.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or duplicate name, or
    /// not-found/conflict/store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn create_label(
        &self,
        actor: UserId,
        board_id: BoardId,
        name: impl Into<String> + Send,
        color: Option<String>,
    ) -> BoardServiceResult<Label> {
        let label_name = name.into();
        self.mutate(board_id, move |board| {
            let label = board.add_label(label_name.clone(), color.clone(), self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::CreateLabel,
                ActivityDetails::new().with("label_name", json!(label.name())),
            );
            Ok((label, vec![entry]))
        })
        .await
    }

    /// Deletes a label, unlinking it from every task on the board.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn delete_label(
        &self,
        actor: UserId,
        board_id: BoardId,
        label_id: LabelId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            let removed = board.delete_label(label_id, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::DeleteLabel,
                ActivityDetails::new().with("label_name", json!(removed.name())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Attaches a board label to a task.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a repeated attach, or
    /// not-found/conflict/store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn attach_label(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        label_id: LabelId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            board.attach_label(task_id, label_id, self.clock())?;
            let label_name = board
                .label(label_id)
                .map(|label| label.name().to_owned())
                .ok_or(NotFoundError::Label(label_id))?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::AttachLabel,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("label_name", json!(label_name)),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Detaches a board label from a task.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the link does not exist, or
    /// not-found/conflict/store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn detach_label(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        label_id: LabelId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            board.detach_label(task_id, label_id, self.clock())?;
            let label_name = board
                .label(label_id)
                .map(|label| label.name().to_owned())
                .ok_or(NotFoundError::Label(label_id))?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::DetachLabel,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("label_name", json!(label_name)),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Adds a comment authored by `actor` to a task.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty text, or
    /// not-found/conflict/store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn add_comment(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        text: impl Into<String> + Send,
    ) -> BoardServiceResult<Comment> {
        let comment_text = text.into();
        self.mutate(board_id, move |board| {
            let comment = Comment::new(actor, comment_text.clone(), self.clock())?;
            board.add_comment(task_id, comment.clone(), self.clock())?;
            let task_title = board
                .task(task_id)
                .map(|task| task.title().to_owned())
                .ok_or(NotFoundError::Task(task_id))?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::AddComment,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("task_title", json!(task_title)),
            );
            Ok((comment, vec![entry]))
        })
        .await
    }

    /// Records an attachment uploaded by `actor` on a task.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn add_attachment(
        &self,
        actor: UserId,
        board_id: BoardId,
        task_id: TaskId,
        file_name: impl Into<String> + Send,
        file_size: u64,
    ) -> BoardServiceResult<Attachment> {
        let upload_name = file_name.into();
        self.mutate(board_id, move |board| {
            let attachment = Attachment::new(upload_name.clone(), file_size, actor, self.clock());
            board.add_attachment(task_id, attachment.clone(), self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::AddAttachment,
                ActivityDetails::new()
                    .with("task_id", json!(task_id.to_string()))
                    .with("file_name", json!(attachment.file_name())),
            );
            Ok((attachment, vec![entry]))
        })
        .await
    }
}
