//! In-memory adapter for the board store port.

mod store;

pub use store::InMemoryBoardStore;
