//! Port contracts for the board bounded context.

pub mod store;

pub use store::{BoardStore, BoardStoreError, BoardStoreResult, VersionedBoard};
