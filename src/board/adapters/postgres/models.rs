//! Diesel row models for board persistence.

use super::schema::{board_activity, boards};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for board records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Board identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub owner: uuid::Uuid,
    /// Member users.
    pub members: Vec<uuid::Uuid>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Full aggregate state.
    pub document: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for board records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = boards)]
pub struct NewBoardRow {
    /// Board identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub owner: uuid::Uuid,
    /// Member users.
    pub members: Vec<uuid::Uuid>,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Full aggregate state.
    pub document: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for activity entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = board_activity)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Board the entry belongs to.
    pub board_id: uuid::Uuid,
    /// Acting user, if still known.
    pub actor: Option<uuid::Uuid>,
    /// Action kind.
    pub action: String,
    /// Structured detail payload.
    pub details: Value,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for activity entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = board_activity)]
pub struct NewActivityRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Board the entry belongs to.
    pub board_id: uuid::Uuid,
    /// Acting user, if still known.
    pub actor: Option<uuid::Uuid>,
    /// Action kind.
    pub action: String,
    /// Structured detail payload.
    pub details: Value,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}
