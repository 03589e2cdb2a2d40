//! Adapter implementations of the board store port.

pub mod memory;
pub mod postgres;
