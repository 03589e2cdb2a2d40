//! Column operations: create, update, move, delete.

use super::boards::{BoardService, BoardServiceResult};
use crate::board::{
    domain::{
        ActivityAction, ActivityDetails, BoardId, Column, ColumnId, ColumnMove, NotFoundError,
        Positioned, UserId, ValidationError, position::checked_target,
    },
    ports::BoardStore,
};
use mockable::Clock;
use serde_json::json;

impl<S, C> BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a column at the end of the board.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title, or
    /// not-found/conflict/store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn create_column(
        &self,
        actor: UserId,
        board_id: BoardId,
        title: impl Into<String> + Send,
        color: Option<String>,
    ) -> BoardServiceResult<Column> {
        let column_title = title.into();
        self.mutate(board_id, move |board| {
            let column = board.add_column(column_title.clone(), color.clone(), self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::CreateColumn,
                ActivityDetails::new()
                    .with("column_title", json!(column.title()))
                    .with("position", json!(column.position())),
            );
            Ok((column, vec![entry]))
        })
        .await
    }

    /// Updates a column's title and/or colour.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn update_column(
        &self,
        actor: UserId,
        board_id: BoardId,
        column_id: ColumnId,
        title: Option<String>,
        color: Option<String>,
    ) -> BoardServiceResult<Column> {
        self.mutate(board_id, move |board| {
            board.update_column(column_id, title.clone(), color.clone(), self.clock())?;
            let column = board
                .column(column_id)
                .cloned()
                .ok_or(NotFoundError::Column(column_id))?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::UpdateColumn,
                ActivityDetails::new().with("column_title", json!(column.title())),
            );
            Ok((column, vec![entry]))
        })
        .await
    }

    /// Deletes a column, cascading to its tasks and compacting sibling
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn delete_column(
        &self,
        actor: UserId,
        board_id: BoardId,
        column_id: ColumnId,
    ) -> BoardServiceResult<()> {
        self.mutate(board_id, move |board| {
            let removed = board.delete_column(column_id, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::DeleteColumn,
                ActivityDetails::new()
                    .with("column_title", json!(removed.title()))
                    .with("task_count", json!(removed.tasks().len())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Moves a column to a new position among its siblings.
    ///
    /// `target` is a signed wire value; negatives fail validation before
    /// any mutation. A move to the current position succeeds and still
    /// logs one entry.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`](super::BoardServiceError).
    pub async fn move_column(
        &self,
        actor: UserId,
        board_id: BoardId,
        column_id: ColumnId,
        target: i64,
    ) -> BoardServiceResult<ColumnMove> {
        let checked = checked_target(target).map_err(ValidationError::from)?;
        self.mutate(board_id, move |board| {
            let outcome = board.move_column(column_id, checked, self.clock())?;
            let entry = self.entry(
                actor,
                board_id,
                ActivityAction::MoveColumn,
                ActivityDetails::new()
                    .with("column_title", json!(outcome.title))
                    .with("from_position", json!(outcome.from))
                    .with("to_position", json!(outcome.to)),
            );
            Ok((outcome, vec![entry]))
        })
        .await
    }
}
