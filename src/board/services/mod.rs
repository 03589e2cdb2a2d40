//! Orchestration services for the board bounded context.
//!
//! [`BoardService`] is the surface the API layer calls: it resolves the
//! aggregate, applies domain mutations, and commits state plus activity
//! entries as one atomic unit with bounded retry on version conflicts.
//! The service performs no authorization; callers pass an
//! already-authorized actor.

mod boards;
mod columns;
mod tasks;

pub use boards::{
    BoardService, BoardServiceError, BoardServiceResult, CreateBoardRequest, UpdateBoardRequest,
};
