//! Board-level operations: lifecycle, membership, and the activity feed.

use crate::board::{
    domain::{
        ActivityAction, ActivityDetails, ActivityEntry, Board, BoardDomainError, BoardId,
        NotFoundError, UserId, ValidationError,
    },
    ports::{BoardStore, BoardStoreError, VersionedBoard},
};
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Commit attempts before a contended mutation surfaces as a conflict.
pub(super) const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Errors surfaced by [`BoardService`] operations.
///
/// Every error means the operation mutated nothing: validation and
/// lookups fail before any write, and a failed commit rolls back
/// wholesale.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// A referenced board, column, task, or label does not exist.
    #[error(transparent)]
    NotFound(NotFoundError),

    /// The input failed domain validation.
    #[error(transparent)]
    Validation(ValidationError),

    /// Concurrent mutations kept winning the serialization race.
    #[error("board {0} is under concurrent modification, giving up after {MAX_COMMIT_ATTEMPTS} attempts")]
    Conflict(BoardId),

    /// The backing store failed; the unit of work was rolled back.
    #[error(transparent)]
    Store(BoardStoreError),
}

impl From<NotFoundError> for BoardServiceError {
    fn from(err: NotFoundError) -> Self {
        Self::NotFound(err)
    }
}

impl From<ValidationError> for BoardServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<BoardDomainError> for BoardServiceError {
    fn from(err: BoardDomainError) -> Self {
        match err {
            BoardDomainError::NotFound(inner) => Self::NotFound(inner),
            BoardDomainError::Validation(inner) => Self::Validation(inner),
        }
    }
}

impl From<BoardStoreError> for BoardServiceError {
    fn from(err: BoardStoreError) -> Self {
        match err {
            BoardStoreError::NotFound(id) => Self::NotFound(NotFoundError::Board(id)),
            other => Self::Store(other),
        }
    }
}

/// Request payload for creating a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBoardRequest {
    title: String,
    description: Option<String>,
    background_color: Option<String>,
}

impl CreateBoardRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            background_color: None,
        }
    }

    /// Sets the board description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the background colour.
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

/// Partial update applied to board fields.
///
/// `None` leaves a field alone; `Some(None)` on the description clears
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBoardRequest {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// Replacement background colour.
    pub background_color: Option<String>,
}

impl UpdateBoardRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a replacement title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Sets a replacement background colour.
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

/// Board orchestration service.
///
/// Generic over the store port and the clock so tests can substitute
/// either.
#[derive(Clone)]
pub struct BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    pub(super) fn clock(&self) -> &C {
        &self.clock
    }

    /// Builds one log entry for the given board mutation.
    pub(super) fn entry(
        &self,
        actor: UserId,
        board: BoardId,
        action: ActivityAction,
        details: ActivityDetails,
    ) -> ActivityEntry {
        ActivityEntry::record(Some(actor), board, action, details, &*self.clock)
    }

    /// Loads, mutates, and commits a board aggregate as one atomic unit,
    /// retrying a bounded number of times when a concurrent commit wins
    /// the version race.
    pub(super) async fn mutate<T, F>(&self, board_id: BoardId, mutation: F) -> BoardServiceResult<T>
    where
        F: Fn(&mut Board) -> BoardServiceResult<(T, Vec<ActivityEntry>)> + Send + Sync,
    {
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let versioned = self
                .store
                .fetch(board_id)
                .await?
                .ok_or(NotFoundError::Board(board_id))?;
            let VersionedBoard { mut board, version } = versioned;
            let (outcome, entries) = mutation(&mut board)?;
            match self.store.commit(&board, version, entries).await {
                Ok(_) => return Ok(outcome),
                Err(BoardStoreError::VersionConflict(_)) => {}
                Err(other) => return Err(other.into()),
            }
        }
        Err(BoardServiceError::Conflict(board_id))
    }

    /// Creates a board owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title, or a store error
    /// when persistence fails.
    pub async fn create_board(
        &self,
        actor: UserId,
        request: CreateBoardRequest,
    ) -> BoardServiceResult<Board> {
        let mut board = Board::new(request.title, actor, &*self.clock)?;
        if let Some(description) = request.description {
            board = board.with_description(description);
        }
        if let Some(color) = request.background_color {
            board = board.with_background_color(color);
        }
        let entry = self.entry(
            actor,
            board.id(),
            ActivityAction::CreateBoard,
            ActivityDetails::new().with("board_title", json!(board.title())),
        );
        self.store.insert(&board, entry).await?;
        Ok(board)
    }

    /// Loads a board aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] when the board is missing.
    pub async fn fetch_board(&self, id: BoardId) -> BoardServiceResult<Board> {
        let versioned = self
            .store
            .fetch(id)
            .await?
            .ok_or(NotFoundError::Board(id))?;
        Ok(versioned.board)
    }

    /// Lists the boards the user owns or is a member of, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the listing fails.
    pub async fn boards_for(&self, user: UserId) -> BoardServiceResult<Vec<Board>> {
        Ok(self.store.boards_for(user).await?)
    }

    /// Applies a partial update to board fields, logging the changes.
    ///
    /// An update that changes nothing still succeeds but appends no
    /// activity entry.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, conflict, or store errors per
    /// [`BoardServiceError`].
    pub async fn update_board(
        &self,
        actor: UserId,
        id: BoardId,
        request: UpdateBoardRequest,
    ) -> BoardServiceResult<Board> {
        self.mutate(id, move |board| {
            let mut details = ActivityDetails::new();
            let mut changed = false;

            if let Some(title) = &request.title
                && title.trim() != board.title()
            {
                details = details
                    .with("old_title", json!(board.title()))
                    .with("new_title", json!(title.trim()));
                board.rename(title.clone(), self.clock())?;
                changed = true;
            }
            if let Some(description) = &request.description
                && description.as_deref() != board.description()
            {
                board.set_description(description.clone(), self.clock());
                details = details.with("description_changed", json!(true));
                changed = true;
            }
            if let Some(color) = &request.background_color
                && color != board.background_color()
            {
                board.set_background_color(color.clone(), self.clock());
                details = details.with("background_color", json!(color));
                changed = true;
            }

            let entries = if changed {
                vec![self.entry(actor, id, ActivityAction::UpdateBoard, details)]
            } else {
                Vec::new()
            };
            Ok((board.clone(), entries))
        })
        .await
    }

    /// Archives a board.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`].
    pub async fn archive_board(&self, actor: UserId, id: BoardId) -> BoardServiceResult<()> {
        self.mutate(id, move |board| {
            board.archive(self.clock());
            let entry = self.entry(
                actor,
                id,
                ActivityAction::ArchiveBoard,
                ActivityDetails::new().with("board_title", json!(board.title())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Restores a board from the archive.
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`].
    pub async fn restore_board(&self, actor: UserId, id: BoardId) -> BoardServiceResult<()> {
        self.mutate(id, move |board| {
            board.restore(self.clock());
            let entry = self.entry(
                actor,
                id,
                ActivityAction::RestoreBoard,
                ActivityDetails::new().with("board_title", json!(board.title())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Deletes a board, cascading to columns, tasks, labels, and the
    /// board's activity log.
    ///
    /// No activity entry is written: log entries live exactly as long as
    /// their board, so a deletion tombstone would be unreadable anyway.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] when the board is missing.
    pub async fn delete_board(&self, id: BoardId) -> BoardServiceResult<()> {
        Ok(self.store.remove(id).await?)
    }

    /// Adds a member to the board.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the user already participates, or
    /// not-found/conflict/store errors per [`BoardServiceError`].
    pub async fn add_member(
        &self,
        actor: UserId,
        id: BoardId,
        user: UserId,
    ) -> BoardServiceResult<()> {
        self.mutate(id, move |board| {
            board.add_member(user, self.clock())?;
            let entry = self.entry(
                actor,
                id,
                ActivityAction::AddMember,
                ActivityDetails::new().with("member_id", json!(user.to_string())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Removes a member from the board.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the user is not a member, or
    /// not-found/conflict/store errors per [`BoardServiceError`].
    pub async fn remove_member(
        &self,
        actor: UserId,
        id: BoardId,
        user: UserId,
    ) -> BoardServiceResult<()> {
        self.mutate(id, move |board| {
            board.remove_member(user, self.clock())?;
            let entry = self.entry(
                actor,
                id,
                ActivityAction::RemoveMember,
                ActivityDetails::new().with("member_id", json!(user.to_string())),
            );
            Ok(((), vec![entry]))
        })
        .await
    }

    /// Clears weak references to a deleted user: membership and task
    /// assignments on the given board.
    ///
    /// Invoked by the user-management collaborator after a user is
    /// removed from the system. Boards the user owned are deleted by the
    /// collaborator instead (exclusive lifecycle tie).
    ///
    /// # Errors
    ///
    /// Returns not-found, conflict, or store errors per
    /// [`BoardServiceError`].
    pub async fn detach_user(&self, id: BoardId, user: UserId) -> BoardServiceResult<()> {
        self.mutate(id, move |board| {
            board.detach_user(user, self.clock());
            Ok(((), Vec::new()))
        })
        .await
    }

    /// Appends a collaborator-originated entry to a board's activity
    /// log.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] when the board is missing,
    /// or a store error when the append fails.
    pub async fn append_log(
        &self,
        actor: Option<UserId>,
        board: BoardId,
        action: ActivityAction,
        details: ActivityDetails,
    ) -> BoardServiceResult<()> {
        let entry = ActivityEntry::record(actor, board, action, details, &*self.clock);
        Ok(self.store.append_activity(entry).await?)
    }

    /// Returns up to `limit` activity entries for a board, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::NotFound`] when the board is missing,
    /// or a store error when the read fails.
    pub async fn activities(
        &self,
        board: BoardId,
        limit: usize,
    ) -> BoardServiceResult<Vec<ActivityEntry>> {
        Ok(self.store.activities(board, limit).await?)
    }
}
