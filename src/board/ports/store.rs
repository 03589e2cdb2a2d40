//! Store port for board aggregate persistence and the activity log.

use crate::board::domain::{ActivityEntry, Board, BoardId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board store operations.
pub type BoardStoreResult<T> = Result<T, BoardStoreError>;

/// A board aggregate together with its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedBoard {
    /// The persisted aggregate state.
    pub board: Board,
    /// Version the state was read at; [`BoardStore::commit`] requires it
    /// back unchanged.
    pub version: u64,
}

/// Durable transactional storage contract for board aggregates.
///
/// Implementations must apply each method as one atomic unit of work: a
/// reader never observes a partially applied commit, and a failed call
/// leaves the previous state intact. `commit` carries the activity-log
/// entries of the mutation so the log append cannot be separated from
/// the state change it describes.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Stores a new board with its creation log entry at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::DuplicateBoard`] when the board ID
    /// already exists.
    async fn insert(&self, board: &Board, entry: ActivityEntry) -> BoardStoreResult<()>;

    /// Loads a board aggregate with its current version.
    ///
    /// Returns `None` when the board does not exist.
    async fn fetch(&self, id: BoardId) -> BoardStoreResult<Option<VersionedBoard>>;

    /// Atomically replaces the aggregate state and appends the given log
    /// entries, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::VersionConflict`] when the stored
    /// version no longer matches `expected_version` (a concurrent commit
    /// won the race) and [`BoardStoreError::NotFound`] when the board has
    /// been deleted since it was read. Nothing is applied on error.
    async fn commit(
        &self,
        board: &Board,
        expected_version: u64,
        entries: Vec<ActivityEntry>,
    ) -> BoardStoreResult<u64>;

    /// Deletes a board, cascading to every owned entity including its
    /// activity log.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::NotFound`] when the board is missing.
    async fn remove(&self, id: BoardId) -> BoardStoreResult<()>;

    /// Returns the boards the user owns or is a member of, newest first.
    async fn boards_for(&self, user: UserId) -> BoardStoreResult<Vec<Board>>;

    /// Returns up to `limit` activity entries for a board, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::NotFound`] when the board is missing.
    async fn activities(&self, board: BoardId, limit: usize)
    -> BoardStoreResult<Vec<ActivityEntry>>;

    /// Appends one activity entry outside an aggregate commit.
    ///
    /// Used for collaborator-side events that do not mutate board state.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::NotFound`] when the entry's board is
    /// missing.
    async fn append_activity(&self, entry: ActivityEntry) -> BoardStoreResult<()>;
}

/// Errors returned by board store implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardStoreError {
    /// A board with the same identifier already exists.
    #[error("duplicate board identifier: {0}")]
    DuplicateBoard(BoardId),

    /// The board was not found.
    #[error("board not found: {0}")]
    NotFound(BoardId),

    /// The expected version is stale; a concurrent commit intervened.
    #[error("version conflict on board {0}")]
    VersionConflict(BoardId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
