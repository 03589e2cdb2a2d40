//! Project board management for Corkboard.
//!
//! Boards own ordered columns, columns own ordered tasks, and every
//! mutation appends an immutable activity-log entry. Sibling positions
//! inside a container are dense zero-based sequences; the reorder engine
//! in [`domain::position`] maintains that invariant for moves, and
//! deletes compact the gap they leave behind. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
