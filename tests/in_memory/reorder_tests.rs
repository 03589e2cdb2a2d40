//! Move semantics through the full service and store stack.

use crate::in_memory::helpers::{TestService, assert_board_dense, owner, seeded_board, service};
use corkboard::board::{
    domain::{TaskId, UserId},
    services::BoardServiceError,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn column_moves_persist_across_fetches(service: TestService, owner: UserId) {
    let (board_id, columns, _) =
        seeded_board(&service, owner, &["Todo", "Doing", "Review", "Done"], 0).await;
    let review = *columns.get(2).expect("third column");

    service
        .move_column(owner, board_id, review, 0)
        .await
        .expect("move should succeed");

    let board = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    let titles: Vec<String> = board
        .columns_ordered()
        .iter()
        .map(|column| column.title().to_owned())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Review".to_owned(),
            "Todo".to_owned(),
            "Doing".to_owned(),
            "Done".to_owned(),
        ]
    );
    assert_board_dense(&board);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_moves_within_a_column_persist(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo"], 4).await;
    let todo = *columns.first().expect("column");
    let last = *tasks.get(3).expect("fourth task");

    service
        .move_task(owner, board_id, last, todo, 0)
        .await
        .expect("move should succeed");

    let board = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    let ordered: Vec<TaskId> = board
        .column(todo)
        .expect("column present")
        .tasks_ordered()
        .iter()
        .map(|task| task.id())
        .collect();
    let expected: Vec<TaskId> = [3, 0, 1, 2]
        .iter()
        .map(|&index| *tasks.get(index).expect("task id"))
        .collect();
    assert_eq!(ordered, expected);
    assert_board_dense(&board);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_column_moves_keep_both_columns_dense(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Doing"], 3).await;
    let todo = *columns.first().expect("source column");
    let doing = *columns.get(1).expect("destination column");
    let moved = *tasks.get(1).expect("second task of Todo");

    service
        .move_task(owner, board_id, moved, doing, 1)
        .await
        .expect("move should succeed");

    let board = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    assert_eq!(board.column(todo).expect("source").tasks().len(), 2);
    assert_eq!(board.column(doing).expect("destination").tasks().len(), 4);
    assert_eq!(
        board.column_of_task(moved).expect("task has a column").id(),
        doing
    );
    assert_board_dense(&board);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_moves_leave_the_stored_board_untouched(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Doing"], 2).await;
    let doing = *columns.get(1).expect("destination column");
    let moved = *tasks.first().expect("first task");

    let before = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");

    // Valid insertion indices for a 2-task destination are 0..=2.
    let result = service.move_task(owner, board_id, moved, doing, 3).await;
    assert!(matches!(result, Err(BoardServiceError::Validation(_))));

    let after = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    assert_eq!(after, before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletes_between_moves_keep_positions_dense(service: TestService, owner: UserId) {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Done"], 3).await;
    let todo = *columns.first().expect("source column");
    let done = *columns.get(1).expect("destination column");

    service
        .delete_task(owner, board_id, *tasks.get(1).expect("middle task"))
        .await
        .expect("deletion should succeed");
    service
        .move_task(
            owner,
            board_id,
            *tasks.first().expect("first task"),
            done,
            2,
        )
        .await
        .expect("move should succeed");
    service
        .delete_column(owner, board_id, todo)
        .await
        .expect("column deletion should succeed");

    let board = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    assert_eq!(board.columns().len(), 1);
    assert_eq!(board.column(done).expect("column present").tasks().len(), 4);
    assert_board_dense(&board);
}
