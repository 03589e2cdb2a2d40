//! Concurrent commits against a single board.
//!
//! The store serializes commits through optimistic versioning; losers of
//! a version race are retried a bounded number of times and otherwise
//! surface as conflicts. Whatever the interleaving, the committed board
//! must keep every position sequence dense and lose no tasks.

use std::sync::Arc;

use crate::in_memory::helpers::{TestService, assert_board_dense, owner, seeded_board, service};
use corkboard::board::{domain::UserId, services::BoardServiceError};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_task_moves_never_corrupt_positions(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Doing"], 3).await;
    let shared = Arc::new(service);

    let handles: Vec<_> = tasks
        .iter()
        .enumerate()
        .map(|(index, &task)| {
            let worker = Arc::clone(&shared);
            let destination = *columns.get(index % 2).expect("column id");
            tokio::spawn(async move {
                worker.move_task(owner, board_id, task, destination, 0).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task should not panic") {
            Ok(_) => successes += 1,
            Err(BoardServiceError::Conflict(id)) => assert_eq!(id, board_id),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let board = shared
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    let total_tasks: usize = board
        .columns()
        .iter()
        .map(|column| column.tasks().len())
        .sum();
    assert_eq!(total_tasks, tasks.len());
    assert_board_dense(&board);

    // Seeding wrote 1 board + 2 column + 6 task entries; each committed
    // move appends exactly one more.
    let log = shared
        .activities(board_id, 50)
        .await
        .expect("log read should succeed");
    assert_eq!(log.len(), 9 + successes);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_column_creation_assigns_distinct_positions(
    service: TestService,
    owner: UserId,
) {
    let (board_id, _, _) = seeded_board(&service, owner, &[], 0).await;
    let shared = Arc::new(service);

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let worker = Arc::clone(&shared);
            tokio::spawn(async move {
                worker
                    .create_column(owner, board_id, format!("Column {index}"), None)
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task should not panic") {
            Ok(_) => successes += 1,
            Err(BoardServiceError::Conflict(id)) => assert_eq!(id, board_id),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(successes >= 1, "at least one creation must win");

    let board = shared
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    assert_eq!(board.columns().len(), successes);
    assert_board_dense(&board);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interleaved_moves_and_deletes_preserve_density(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Done"], 4).await;
    let shared = Arc::new(service);
    let done = *columns.get(1).expect("destination column");

    let handles: Vec<_> = tasks
        .iter()
        .enumerate()
        .map(|(index, &task)| {
            let worker = Arc::clone(&shared);
            tokio::spawn(async move {
                if index % 2 == 0 {
                    worker.delete_task(owner, board_id, task).await
                } else {
                    worker
                        .move_task(owner, board_id, task, done, 0)
                        .await
                        .map(|_| ())
                }
            })
        })
        .collect();

    let mut deleted = 0;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await.expect("task should not panic") {
            Ok(()) if index % 2 == 0 => deleted += 1,
            Ok(()) => {}
            Err(BoardServiceError::Conflict(id)) => assert_eq!(id, board_id),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let board = shared
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    let total_tasks: usize = board
        .columns()
        .iter()
        .map(|column| column.tasks().len())
        .sum();
    assert_eq!(total_tasks, tasks.len() - deleted);
    assert_board_dense(&board);
}
