//! Board lifecycle flows through [`BoardService`] backed by the
//! in-memory store.

use crate::in_memory::helpers::{TestService, owner, seeded_board, service};
use corkboard::board::{
    domain::{ActivityAction, TaskDraft, UserId},
    services::{BoardServiceError, CreateBoardRequest, UpdateBoardRequest},
};
use eyre::OptionExt;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_board_lifecycle_keeps_state_and_log_in_step(
    service: TestService,
    owner: UserId,
) -> eyre::Result<()> {
    let (board_id, columns, tasks) = seeded_board(&service, owner, &["Todo", "Done"], 2).await;
    let todo = *columns.first().ok_or_eyre("first column")?;
    let first_task = *tasks.first().ok_or_eyre("first task")?;

    service
        .update_board(
            owner,
            board_id,
            UpdateBoardRequest::new()
                .with_title("Renamed board")
                .with_description("Now with a description"),
        )
        .await?;
    service.archive_task(owner, board_id, first_task).await?;
    service.restore_task(owner, board_id, first_task).await?;
    service.delete_task(owner, board_id, first_task).await?;

    let board = service.fetch_board(board_id).await?;
    assert_eq!(board.title(), "Renamed board");
    assert_eq!(board.description(), Some("Now with a description"));
    assert!(board.task(first_task).is_none());
    assert_eq!(
        board.column(todo).ok_or_eyre("column present")?.tasks().len(),
        1
    );

    let log = service.activities(board_id, 20).await?;
    let actions: Vec<ActivityAction> = log.iter().map(|entry| entry.action()).collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::DeleteTask,
            ActivityAction::RestoreTask,
            ActivityAction::ArchiveTask,
            ActivityAction::UpdateBoard,
            ActivityAction::CreateTask,
            ActivityAction::CreateTask,
            ActivityAction::CreateColumn,
            ActivityAction::CreateTask,
            ActivityAction::CreateTask,
            ActivityAction::CreateColumn,
            ActivityAction::CreateBoard,
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn membership_grants_and_revokes_visibility(service: TestService, owner: UserId) {
    let member = UserId::new();
    let board = service
        .create_board(owner, CreateBoardRequest::new("Shared"))
        .await
        .expect("board creation should succeed");

    assert!(service.boards_for(member).await.expect("listing").is_empty());

    service
        .add_member(owner, board.id(), member)
        .await
        .expect("add should succeed");
    let visible = service.boards_for(member).await.expect("listing");
    assert_eq!(visible.len(), 1);

    service
        .remove_member(owner, board.id(), member)
        .await
        .expect("removal should succeed");
    assert!(service.boards_for(member).await.expect("listing").is_empty());

    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    let actions: Vec<ActivityAction> = log.iter().map(|entry| entry.action()).collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::RemoveMember,
            ActivityAction::AddMember,
            ActivityAction::CreateBoard,
        ]
    );
    assert_eq!(
        log.first()
            .expect("newest entry")
            .details()
            .as_map()
            .get("member_id"),
        Some(&json!(member.to_string()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_boards_stay_listed_until_deleted(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Old project"))
        .await
        .expect("board creation should succeed");

    service
        .archive_board(owner, board.id())
        .await
        .expect("archive should succeed");
    let listed = service.boards_for(owner).await.expect("listing");
    assert_eq!(listed.len(), 1);
    assert!(listed.first().expect("board").is_archived());

    service
        .restore_board(owner, board.id())
        .await
        .expect("restore should succeed");
    let restored_list = service.boards_for(owner).await.expect("listing");
    assert!(!restored_list.first().expect("board").is_archived());

    service
        .delete_board(board.id())
        .await
        .expect("deletion should succeed");
    assert!(service.boards_for(owner).await.expect("listing").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn label_and_comment_flow_round_trips(service: TestService, owner: UserId) {
    let (board_id, columns, _) = seeded_board(&service, owner, &["Todo"], 0).await;
    let todo = *columns.first().expect("column");
    let task = service
        .create_task(owner, board_id, todo, TaskDraft::new("Investigate crash"))
        .await
        .expect("task creation should succeed");

    let label = service
        .create_label(owner, board_id, "regression", Some("#eb5a46".to_owned()))
        .await
        .expect("label creation should succeed");
    assert_eq!(label.color(), "#eb5a46");
    service
        .attach_label(owner, board_id, task.id(), label.id())
        .await
        .expect("attach should succeed");
    service
        .add_comment(owner, board_id, task.id(), "Bisected to the cache change")
        .await
        .expect("comment should succeed");

    let board = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    let stored = board.task(task.id()).expect("task present");
    assert_eq!(stored.labels(), &[label.id()]);
    let comment = stored.comments().first().expect("one comment");
    assert_eq!(comment.author(), owner);
    assert_eq!(comment.text(), "Bisected to the cache change");

    // Deleting the task takes its comments and label links with it.
    service
        .delete_task(owner, board_id, task.id())
        .await
        .expect("deletion should succeed");
    let after_delete = service
        .fetch_board(board_id)
        .await
        .expect("fetch should succeed");
    assert!(after_delete.task(task.id()).is_none());
    assert_eq!(after_delete.labels().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_member_surfaces_as_validation_error(service: TestService, owner: UserId) {
    let member = UserId::new();
    let board = service
        .create_board(owner, CreateBoardRequest::new("Shared"))
        .await
        .expect("board creation should succeed");
    service
        .add_member(owner, board.id(), member)
        .await
        .expect("first add should succeed");

    let result = service.add_member(owner, board.id(), member).await;
    assert!(matches!(result, Err(BoardServiceError::Validation(_))));

    // The failed attempt must not have appended a log entry.
    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    assert_eq!(log.len(), 2);
}
