//! Diesel schema for board persistence.
//!
//! The aggregate is stored as one jsonb document per board; `owner` and
//! `members` are mirrored into plain columns so membership listings do
//! not have to unpack the document. `version` backs optimistic
//! concurrency: commits bump it and readers carry it back.

diesel::table! {
    /// Board aggregates, one row per board.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Owning user, mirrored from the document.
        owner -> Uuid,
        /// Member users, mirrored from the document.
        members -> Array<Uuid>,
        /// Optimistic-concurrency version, starting at 1.
        version -> Int8,
        /// Full aggregate state.
        document -> Jsonb,
        /// Creation timestamp, mirrored from the document.
        created_at -> Timestamptz,
        /// Last modification timestamp, mirrored from the document.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only activity log, deleted only with its board.
    board_activity (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Board the entry belongs to.
        board_id -> Uuid,
        /// Acting user; null when deleted or system-originated.
        actor -> Nullable<Uuid>,
        /// Action kind.
        #[max_length = 50]
        action -> Varchar,
        /// Structured detail payload.
        details -> Jsonb,
        /// Event timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(board_activity -> boards (board_id));
diesel::allow_tables_to_appear_in_same_query!(boards, board_activity);
