//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `board_flow_tests`: Board lifecycle, membership, and the activity feed
//! - `reorder_tests`: Column and task moves with density invariants
//! - `concurrency_tests`: Concurrent commits against a single board

mod in_memory {
    pub mod helpers;

    mod board_flow_tests;
    mod concurrency_tests;
    mod reorder_tests;
}
