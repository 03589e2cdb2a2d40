//! Unit tests for the board module.
//!
//! Tests are organised by concern: the position engine, aggregate
//! domain behaviour, move semantics, the activity log, service
//! orchestration, and commit-retry handling.

mod service_tests;
