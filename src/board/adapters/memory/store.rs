//! In-memory board store for tests and embedding.
//!
//! A single `RwLock` over the whole state is the mutual-exclusion scope:
//! every commit swaps the aggregate and appends its log entries under
//! one write lock, so concurrent units of work serialize and no reader
//! can observe a half-applied move.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{ActivityEntry, Board, BoardId, UserId},
    ports::{BoardStore, BoardStoreError, BoardStoreResult, VersionedBoard},
};

/// Thread-safe in-memory board store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardStore {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    boards: HashMap<BoardId, StoredBoard>,
    activities: HashMap<BoardId, Vec<ActivityEntry>>,
}

#[derive(Debug)]
struct StoredBoard {
    version: u64,
    board: Board,
}

impl InMemoryBoardStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> BoardStoreError {
    BoardStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn insert(&self, board: &Board, entry: ActivityEntry) -> BoardStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.boards.contains_key(&board.id()) {
            return Err(BoardStoreError::DuplicateBoard(board.id()));
        }
        state.boards.insert(
            board.id(),
            StoredBoard {
                version: 1,
                board: board.clone(),
            },
        );
        state.activities.entry(board.id()).or_default().push(entry);
        Ok(())
    }

    async fn fetch(&self, id: BoardId) -> BoardStoreResult<Option<VersionedBoard>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.boards.get(&id).map(|stored| VersionedBoard {
            board: stored.board.clone(),
            version: stored.version,
        }))
    }

    async fn commit(
        &self,
        board: &Board,
        expected_version: u64,
        entries: Vec<ActivityEntry>,
    ) -> BoardStoreResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .boards
            .get_mut(&board.id())
            .ok_or(BoardStoreError::NotFound(board.id()))?;
        if stored.version != expected_version {
            return Err(BoardStoreError::VersionConflict(board.id()));
        }
        stored.version += 1;
        stored.board = board.clone();
        let new_version = stored.version;
        state
            .activities
            .entry(board.id())
            .or_default()
            .extend(entries);
        Ok(new_version)
    }

    async fn remove(&self, id: BoardId) -> BoardStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.boards.remove(&id).is_none() {
            return Err(BoardStoreError::NotFound(id));
        }
        state.activities.remove(&id);
        Ok(())
    }

    async fn boards_for(&self, user: UserId) -> BoardStoreResult<Vec<Board>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|stored| stored.board.is_accessible_by(user))
            .map(|stored| stored.board.clone())
            .collect();
        boards.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(boards)
    }

    async fn activities(
        &self,
        board: BoardId,
        limit: usize,
    ) -> BoardStoreResult<Vec<ActivityEntry>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        if !state.boards.contains_key(&board) {
            return Err(BoardStoreError::NotFound(board));
        }
        let entries = state
            .activities
            .get(&board)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .take(limit)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(entries)
    }

    async fn append_activity(&self, entry: ActivityEntry) -> BoardStoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.boards.contains_key(&entry.board()) {
            return Err(BoardStoreError::NotFound(entry.board()));
        }
        state.activities.entry(entry.board()).or_default().push(entry);
        Ok(())
    }
}
