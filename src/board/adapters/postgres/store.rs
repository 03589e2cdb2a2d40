//! `PostgreSQL` board store implementation.
//!
//! Each port method is one database transaction. Commits guard on the
//! stored `version` column: an `UPDATE ... WHERE version = expected`
//! that matches zero rows means a concurrent commit won the race, and
//! the transaction (including the activity-log inserts) rolls back as a
//! whole.

use super::{
    models::{ActivityRow, BoardRow, NewActivityRow, NewBoardRow},
    schema::{board_activity, boards},
};
use crate::board::{
    domain::{ActivityAction, ActivityDetails, ActivityEntry, ActivityId, Board, BoardId, UserId},
    ports::{BoardStore, BoardStoreError, BoardStoreResult, VersionedBoard},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed board store.
#[derive(Debug, Clone)]
pub struct PostgresBoardStore {
    pool: BoardPgPool,
}

impl From<DieselError> for BoardStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresBoardStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardStoreError::persistence)?
    }
}

#[async_trait]
impl BoardStore for PostgresBoardStore {
    async fn insert(&self, board: &Board, entry: ActivityEntry) -> BoardStoreResult<()> {
        let board_id = board.id();
        let new_row = to_new_row(board, 1)?;
        let activity_row = to_activity_row(&entry);

        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardStoreError, _>(|tx| {
                diesel::insert_into(boards::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            BoardStoreError::DuplicateBoard(board_id)
                        }
                        other => BoardStoreError::persistence(other),
                    })?;
                diesel::insert_into(board_activity::table)
                    .values(&activity_row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn fetch(&self, id: BoardId) -> BoardStoreResult<Option<VersionedBoard>> {
        self.run_blocking(move |connection| {
            let row = boards::table
                .filter(boards::id.eq(id.into_inner()))
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()
                .map_err(BoardStoreError::persistence)?;
            row.map(row_to_versioned).transpose()
        })
        .await
    }

    async fn commit(
        &self,
        board: &Board,
        expected_version: u64,
        entries: Vec<ActivityEntry>,
    ) -> BoardStoreResult<u64> {
        let board_id = board.id();
        let expected =
            i64::try_from(expected_version).map_err(BoardStoreError::persistence)?;
        let next = expected
            .checked_add(1)
            .ok_or_else(|| BoardStoreError::persistence(std::io::Error::other("version overflow")))?;
        let document = serde_json::to_value(board).map_err(BoardStoreError::persistence)?;
        let members: Vec<uuid::Uuid> = board
            .members()
            .iter()
            .map(|member| member.into_inner())
            .collect();
        let updated_at = board.updated_at();
        let activity_rows: Vec<NewActivityRow> = entries.iter().map(to_activity_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardStoreError, _>(|tx| {
                let affected = diesel::update(
                    boards::table
                        .filter(boards::id.eq(board_id.into_inner()))
                        .filter(boards::version.eq(expected)),
                )
                .set((
                    boards::document.eq(&document),
                    boards::members.eq(&members),
                    boards::version.eq(next),
                    boards::updated_at.eq(updated_at),
                ))
                .execute(tx)?;

                if affected == 0 {
                    let exists: i64 = boards::table
                        .filter(boards::id.eq(board_id.into_inner()))
                        .count()
                        .get_result(tx)?;
                    if exists == 0 {
                        return Err(BoardStoreError::NotFound(board_id));
                    }
                    return Err(BoardStoreError::VersionConflict(board_id));
                }

                diesel::insert_into(board_activity::table)
                    .values(&activity_rows)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await?;

        u64::try_from(next).map_err(BoardStoreError::persistence)
    }

    async fn remove(&self, id: BoardId) -> BoardStoreResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardStoreError, _>(|tx| {
                // Explicit cascade: the log dies with its board.
                diesel::delete(
                    board_activity::table.filter(board_activity::board_id.eq(id.into_inner())),
                )
                .execute(tx)?;
                let affected =
                    diesel::delete(boards::table.filter(boards::id.eq(id.into_inner())))
                        .execute(tx)?;
                if affected == 0 {
                    return Err(BoardStoreError::NotFound(id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn boards_for(&self, user: UserId) -> BoardStoreResult<Vec<Board>> {
        let user_uuid = user.into_inner();
        self.run_blocking(move |connection| {
            let rows = boards::table
                .filter(
                    boards::owner
                        .eq(user_uuid)
                        .or(boards::members.contains(vec![user_uuid])),
                )
                .order(boards::created_at.desc())
                .select(BoardRow::as_select())
                .load::<BoardRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            rows.into_iter().map(row_to_board).collect()
        })
        .await
    }

    async fn activities(
        &self,
        board: BoardId,
        limit: usize,
    ) -> BoardStoreResult<Vec<ActivityEntry>> {
        let row_limit = i64::try_from(limit).map_err(BoardStoreError::persistence)?;
        self.run_blocking(move |connection| {
            let exists: i64 = boards::table
                .filter(boards::id.eq(board.into_inner()))
                .count()
                .get_result(connection)
                .map_err(BoardStoreError::persistence)?;
            if exists == 0 {
                return Err(BoardStoreError::NotFound(board));
            }
            let rows = board_activity::table
                .filter(board_activity::board_id.eq(board.into_inner()))
                .order(board_activity::created_at.desc())
                .limit(row_limit)
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }

    async fn append_activity(&self, entry: ActivityEntry) -> BoardStoreResult<()> {
        let board = entry.board();
        let activity_row = to_activity_row(&entry);
        self.run_blocking(move |connection| {
            let exists: i64 = boards::table
                .filter(boards::id.eq(board.into_inner()))
                .count()
                .get_result(connection)
                .map_err(BoardStoreError::persistence)?;
            if exists == 0 {
                return Err(BoardStoreError::NotFound(board));
            }
            diesel::insert_into(board_activity::table)
                .values(&activity_row)
                .execute(connection)
                .map_err(BoardStoreError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn to_new_row(board: &Board, version: i64) -> BoardStoreResult<NewBoardRow> {
    let document = serde_json::to_value(board).map_err(BoardStoreError::persistence)?;
    Ok(NewBoardRow {
        id: board.id().into_inner(),
        owner: board.owner().into_inner(),
        members: board
            .members()
            .iter()
            .map(|member| member.into_inner())
            .collect(),
        version,
        document,
        created_at: board.created_at(),
        updated_at: board.updated_at(),
    })
}

fn to_activity_row(entry: &ActivityEntry) -> NewActivityRow {
    NewActivityRow {
        id: entry.id().into_inner(),
        board_id: entry.board().into_inner(),
        actor: entry.actor().map(UserId::into_inner),
        action: entry.action().as_str().to_owned(),
        details: Value::Object(entry.details().as_map().clone()),
        created_at: entry.created_at(),
    }
}

fn row_to_board(row: BoardRow) -> BoardStoreResult<Board> {
    serde_json::from_value::<Board>(row.document).map_err(BoardStoreError::persistence)
}

fn row_to_versioned(row: BoardRow) -> BoardStoreResult<VersionedBoard> {
    let version = u64::try_from(row.version).map_err(BoardStoreError::persistence)?;
    let board = row_to_board(row)?;
    Ok(VersionedBoard { board, version })
}

fn row_to_entry(row: ActivityRow) -> BoardStoreResult<ActivityEntry> {
    let action =
        ActivityAction::try_from(row.action.as_str()).map_err(BoardStoreError::persistence)?;
    let details = match row.details {
        Value::Object(map) => ActivityDetails::from(map),
        _ => ActivityDetails::new(),
    };
    Ok(ActivityEntry::from_persisted(
        ActivityId::from_uuid(row.id),
        BoardId::from_uuid(row.board_id),
        row.actor.map(UserId::from_uuid),
        action,
        details,
        row.created_at,
    ))
}
