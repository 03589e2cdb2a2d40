//! Shared fixtures and helpers for in-memory integration tests.

use std::sync::Arc;

use corkboard::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{Board, BoardId, ColumnId, Positioned, TaskDraft, TaskId, UserId},
    services::{BoardService, CreateBoardRequest},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used across the in-memory suites.
pub type TestService = BoardService<InMemoryBoardStore, DefaultClock>;

/// Provides a service over a fresh in-memory store.
#[fixture]
pub fn service() -> TestService {
    BoardService::new(Arc::new(InMemoryBoardStore::new()), Arc::new(DefaultClock))
}

/// Provides a distinct owning user per test.
#[fixture]
pub fn owner() -> UserId {
    UserId::new()
}

/// Creates a board with the given columns, each holding `tasks_per_column`
/// tasks named after their column and index.
pub async fn seeded_board(
    service: &TestService,
    owner: UserId,
    columns: &[&str],
    tasks_per_column: usize,
) -> (BoardId, Vec<ColumnId>, Vec<TaskId>) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Seeded board"))
        .await
        .expect("board creation should succeed");
    let mut column_ids = Vec::new();
    let mut task_ids = Vec::new();
    for title in columns {
        let column = service
            .create_column(owner, board.id(), (*title).to_owned(), None)
            .await
            .expect("column creation should succeed");
        for index in 0..tasks_per_column {
            let task = service
                .create_task(
                    owner,
                    board.id(),
                    column.id(),
                    TaskDraft::new(format!("{title} task {index}")),
                )
                .await
                .expect("task creation should succeed");
            task_ids.push(task.id());
        }
        column_ids.push(column.id());
    }
    (board.id(), column_ids, task_ids)
}

/// Asserts that every position sequence on the board is dense.
pub fn assert_board_dense(board: &Board) {
    let column_positions: Vec<usize> = board
        .columns()
        .iter()
        .map(Positioned::position)
        .collect();
    assert!(
        corkboard::board::domain::position::is_dense(&column_positions),
        "column positions must be dense, got {column_positions:?}"
    );
    for column in board.columns() {
        let task_positions: Vec<usize> =
            column.tasks().iter().map(Positioned::position).collect();
        assert!(
            corkboard::board::domain::position::is_dense(&task_positions),
            "task positions in '{}' must be dense, got {task_positions:?}",
            column.title()
        );
    }
}
