//! Service orchestration tests over the in-memory store.

use std::sync::Arc;

use crate::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{
        ActivityAction, ActivityDetails, BoardId, NotFoundError, Positioned, Priority, TaskDraft,
        TaskPatch, UserId,
    },
    services::{BoardService, BoardServiceError, CreateBoardRequest, UpdateBoardRequest},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::json;

type TestService = BoardService<InMemoryBoardStore, DefaultClock>;

#[fixture]
fn service() -> TestService {
    BoardService::new(Arc::new(InMemoryBoardStore::new()), Arc::new(DefaultClock))
}

#[fixture]
fn owner() -> UserId {
    UserId::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_board_persists_and_logs_creation(service: TestService, owner: UserId) {
    let board = service
        .create_board(
            owner,
            CreateBoardRequest::new("Release planning").with_description("Q3 scope"),
        )
        .await
        .expect("board creation should succeed");

    let fetched = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(fetched, board);
    assert_eq!(fetched.description(), Some("Q3 scope"));

    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    assert_eq!(log.len(), 1);
    let entry = log.first().expect("one entry");
    assert_eq!(entry.action(), ActivityAction::CreateBoard);
    assert_eq!(entry.actor(), Some(owner));
    assert_eq!(
        entry.details().as_map().get("board_title"),
        Some(&json!("Release planning"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_board_rejects_blank_title(service: TestService, owner: UserId) {
    let result = service
        .create_board(owner, CreateBoardRequest::new("   "))
        .await;
    assert!(matches!(result, Err(BoardServiceError::Validation(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_missing_board_reports_not_found(service: TestService) {
    let missing = BoardId::new();
    let result = service.fetch_board(missing).await;
    assert!(matches!(
        result,
        Err(BoardServiceError::NotFound(NotFoundError::Board(id))) if id == missing
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_board_logs_only_real_changes(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Sprint 12"))
        .await
        .expect("board creation should succeed");

    // Same title again: success, but nothing to log.
    service
        .update_board(
            owner,
            board.id(),
            UpdateBoardRequest::new().with_title("Sprint 12"),
        )
        .await
        .expect("no-op update should succeed");
    let unchanged_log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    assert_eq!(unchanged_log.len(), 1);

    let updated = service
        .update_board(
            owner,
            board.id(),
            UpdateBoardRequest::new().with_title("Sprint 13"),
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.title(), "Sprint 13");

    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    assert_eq!(log.len(), 2);
    let entry = log.first().expect("newest entry");
    assert_eq!(entry.action(), ActivityAction::UpdateBoard);
    assert_eq!(
        entry.details().as_map().get("new_title"),
        Some(&json!("Sprint 13"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boards_for_lists_owned_and_member_boards(service: TestService, owner: UserId) {
    let member = UserId::new();
    let owned = service
        .create_board(owner, CreateBoardRequest::new("Owned"))
        .await
        .expect("first board");
    let shared = service
        .create_board(member, CreateBoardRequest::new("Shared"))
        .await
        .expect("second board");
    service
        .add_member(member, shared.id(), owner)
        .await
        .expect("membership should succeed");

    let visible = service
        .boards_for(owner)
        .await
        .expect("listing should succeed");
    let ids: Vec<BoardId> = visible.iter().map(|board| board.id()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&owned.id()));
    assert!(ids.contains(&shared.id()));

    let stranger_view = service
        .boards_for(UserId::new())
        .await
        .expect("listing should succeed");
    assert!(stranger_view.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_board_removes_board_and_log(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Doomed"))
        .await
        .expect("board creation should succeed");

    service
        .delete_board(board.id())
        .await
        .expect("deletion should succeed");

    let fetched = service.fetch_board(board.id()).await;
    assert!(matches!(fetched, Err(BoardServiceError::NotFound(_))));
    let log = service.activities(board.id(), 10).await;
    assert!(matches!(log, Err(BoardServiceError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn column_lifecycle_updates_aggregate_and_log(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let todo = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("first column");
    let doing = service
        .create_column(owner, board.id(), "Doing", None)
        .await
        .expect("second column");
    assert_eq!(todo.position(), 0);
    assert_eq!(doing.position(), 1);

    let renamed = service
        .update_column(owner, board.id(), todo.id(), Some("Backlog".to_owned()), None)
        .await
        .expect("rename should succeed");
    assert_eq!(renamed.title(), "Backlog");

    service
        .move_column(owner, board.id(), doing.id(), 0)
        .await
        .expect("move should succeed");
    let after_move = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    let titles: Vec<String> = after_move
        .columns_ordered()
        .iter()
        .map(|column| column.title().to_owned())
        .collect();
    assert_eq!(titles, vec!["Doing".to_owned(), "Backlog".to_owned()]);

    service
        .delete_column(owner, board.id(), todo.id())
        .await
        .expect("deletion should succeed");
    let after_delete = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(after_delete.columns().len(), 1);

    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    let actions: Vec<ActivityAction> = log.iter().map(|entry| entry.action()).collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::DeleteColumn,
            ActivityAction::MoveColumn,
            ActivityAction::UpdateColumn,
            ActivityAction::CreateColumn,
            ActivityAction::CreateColumn,
            ActivityAction::CreateBoard,
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_column_rejects_negative_target(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let column = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("column");

    let result = service.move_column(owner, board.id(), column.id(), -2).await;
    assert!(matches!(result, Err(BoardServiceError::Validation(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_update_logs_old_and_new_values(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let column = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("column");
    let task = service
        .create_task(owner, board.id(), column.id(), TaskDraft::new("Fix login"))
        .await
        .expect("task creation should succeed");

    let patch = TaskPatch {
        title: None,
        description: None,
        assignee: None,
        due_date: None,
        priority: Some(Priority::High),
    };
    service
        .update_task(owner, board.id(), task.id(), patch)
        .await
        .expect("update should succeed");

    let log = service
        .activities(board.id(), 1)
        .await
        .expect("log read should succeed");
    let entry = log.first().expect("newest entry");
    assert_eq!(entry.action(), ActivityAction::UpdateTask);
    let changes = entry
        .details()
        .as_map()
        .get("changes")
        .expect("changes recorded");
    assert_eq!(
        changes.get("priority"),
        Some(&json!({"old": "medium", "new": "high"}))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_task_patch_appends_no_log_entry(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let column = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("column");
    let task = service
        .create_task(owner, board.id(), column.id(), TaskDraft::new("Fix login"))
        .await
        .expect("task creation should succeed");

    service
        .update_task(owner, board.id(), task.id(), TaskPatch::new())
        .await
        .expect("no-op update should succeed");

    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    assert!(
        log.iter()
            .all(|entry| entry.action() != ActivityAction::UpdateTask)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_task_logs_source_and_destination(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let todo = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("source column");
    let doing = service
        .create_column(owner, board.id(), "Doing", None)
        .await
        .expect("destination column");
    let task = service
        .create_task(owner, board.id(), todo.id(), TaskDraft::new("Fix login"))
        .await
        .expect("task creation should succeed");

    service
        .move_task(owner, board.id(), task.id(), doing.id(), 0)
        .await
        .expect("move should succeed");

    let fetched = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    let holder = fetched.column_of_task(task.id()).expect("task has a column");
    assert_eq!(holder.id(), doing.id());

    let log = service
        .activities(board.id(), 1)
        .await
        .expect("log read should succeed");
    let entry = log.first().expect("newest entry");
    assert_eq!(entry.action(), ActivityAction::MoveTask);
    assert_eq!(
        entry.details().as_map().get("from_column"),
        Some(&json!("Todo"))
    );
    assert_eq!(
        entry.details().as_map().get("to_column"),
        Some(&json!("Doing"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_task_to_current_position_still_logs(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let todo = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("column");
    let task = service
        .create_task(owner, board.id(), todo.id(), TaskDraft::new("Fix login"))
        .await
        .expect("task creation should succeed");

    service
        .move_task(owner, board.id(), task.id(), todo.id(), 0)
        .await
        .expect("no-op move should succeed");

    let log = service
        .activities(board.id(), 1)
        .await
        .expect("log read should succeed");
    assert_eq!(
        log.first().expect("newest entry").action(),
        ActivityAction::MoveTask
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn labels_comments_and_attachments_flow_through_the_service(
    service: TestService,
    owner: UserId,
) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    let column = service
        .create_column(owner, board.id(), "Todo", None)
        .await
        .expect("column");
    let task = service
        .create_task(owner, board.id(), column.id(), TaskDraft::new("Fix login"))
        .await
        .expect("task creation should succeed");

    let label = service
        .create_label(owner, board.id(), "bug", None)
        .await
        .expect("label creation should succeed");
    service
        .attach_label(owner, board.id(), task.id(), label.id())
        .await
        .expect("attach should succeed");
    let comment = service
        .add_comment(owner, board.id(), task.id(), "Root cause found")
        .await
        .expect("comment should succeed");
    assert_eq!(comment.text(), "Root cause found");
    let attachment = service
        .add_attachment(owner, board.id(), task.id(), "trace.log", 2048)
        .await
        .expect("attachment should succeed");
    assert_eq!(attachment.file_size(), 2048);

    let after_setup = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    let stored = after_setup.task(task.id()).expect("task present");
    assert_eq!(stored.labels(), &[label.id()]);
    assert_eq!(stored.comments().len(), 1);
    assert_eq!(stored.attachments().len(), 1);

    service
        .detach_label(owner, board.id(), task.id(), label.id())
        .await
        .expect("detach should succeed");
    service
        .delete_label(owner, board.id(), label.id())
        .await
        .expect("label deletion should succeed");
    let after_cleanup = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    assert!(after_cleanup.labels().is_empty());

    let log = service
        .activities(board.id(), 1)
        .await
        .expect("log read should succeed");
    let newest = log.first().expect("newest entry");
    assert_eq!(newest.action(), ActivityAction::DeleteLabel);
    assert_eq!(
        newest.details().as_map().get("label_name"),
        Some(&json!("bug"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_log_records_collaborator_events(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");

    service
        .append_log(
            None,
            board.id(),
            ActivityAction::UpdateBoard,
            ActivityDetails::new().with("source", json!("import")),
        )
        .await
        .expect("append should succeed");

    let log = service
        .activities(board.id(), 1)
        .await
        .expect("log read should succeed");
    let entry = log.first().expect("newest entry");
    assert_eq!(entry.actor(), None);
    assert_eq!(entry.details().as_map().get("source"), Some(&json!("import")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activities_respects_the_limit_newest_first(service: TestService, owner: UserId) {
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    for index in 0..5 {
        service
            .create_column(owner, board.id(), format!("Column {index}"), None)
            .await
            .expect("column creation should succeed");
    }

    let log = service
        .activities(board.id(), 3)
        .await
        .expect("log read should succeed");
    assert_eq!(log.len(), 3);
    assert!(
        log.iter()
            .all(|entry| entry.action() == ActivityAction::CreateColumn)
    );
    assert_eq!(
        log.first().expect("newest").details().as_map().get("column_title"),
        Some(&json!("Column 4"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn detach_user_clears_membership_without_logging(service: TestService, owner: UserId) {
    let member = UserId::new();
    let board = service
        .create_board(owner, CreateBoardRequest::new("Workflow"))
        .await
        .expect("board creation should succeed");
    service
        .add_member(owner, board.id(), member)
        .await
        .expect("membership should succeed");

    service
        .detach_user(board.id(), member)
        .await
        .expect("detach should succeed");

    let fetched = service
        .fetch_board(board.id())
        .await
        .expect("fetch should succeed");
    assert!(fetched.members().is_empty());
    let log = service
        .activities(board.id(), 10)
        .await
        .expect("log read should succeed");
    let actions: Vec<ActivityAction> = log.iter().map(|entry| entry.action()).collect();
    assert_eq!(
        actions,
        vec![ActivityAction::AddMember, ActivityAction::CreateBoard]
    );
}
