//! `PostgreSQL` adapters for board persistence.

mod models;
mod schema;
mod store;

pub use store::{BoardPgPool, PostgresBoardStore};
