//! Position allocation and the sibling reorder engine.
//!
//! Sibling positions within a container (columns within a board, tasks
//! within a column) form a dense zero-based sequence: exactly
//! `{0..n-1}` with no gaps or duplicates. This module owns every
//! position mutation. It is written once over the [`Positioned`] trait
//! and shared by both container/item pairs, so the column-move and
//! task-move operations cannot drift apart.
//!
//! Target positions are 0-based insertion indices for in-container and
//! cross-container moves alike.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An item carrying an integer ordering key within its container.
pub trait Positioned {
    /// Returns the current zero-based position.
    fn position(&self) -> usize;

    /// Overwrites the position.
    fn set_position(&mut self, position: usize);
}

/// A move target rejected before any mutation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionError {
    /// The caller supplied a negative target position.
    #[error("target position {0} is negative")]
    Negative(i64),

    /// The target position exceeds the valid bound for the move.
    #[error("target position {requested} out of bounds, maximum is {limit}")]
    OutOfBounds {
        /// Requested target position.
        requested: usize,
        /// Largest position the move may target.
        limit: usize,
    },
}

/// Converts a caller-supplied signed position into a validated index.
///
/// The service boundary accepts `i64` so that a negative wire value maps
/// to a [`PositionError::Negative`] validation error rather than a wrap.
///
/// # Errors
///
/// Returns [`PositionError::Negative`] when `target` is below zero.
pub fn checked_target(target: i64) -> Result<usize, PositionError> {
    usize::try_from(target).map_err(|_| PositionError::Negative(target))
}

/// Returns the append position for a new sibling: `max + 1`, or `0` for
/// an empty container.
///
/// Called exactly once per column or task, at creation time.
///
/// # Examples
///
/// ```
/// use corkboard::board::domain::position::append_position;
///
/// let empty: [Slot; 0] = [];
/// # use corkboard::board::domain::position::Positioned;
/// # #[derive(Clone, Copy)] struct Slot(usize);
/// # impl Positioned for Slot {
/// #     fn position(&self) -> usize { self.0 }
/// #     fn set_position(&mut self, position: usize) { self.0 = position; }
/// # }
/// assert_eq!(append_position(&empty), 0);
/// assert_eq!(append_position(&[Slot(0), Slot(1)]), 2);
/// ```
pub fn append_position<T: Positioned>(siblings: &[T]) -> usize {
    siblings
        .iter()
        .map(Positioned::position)
        .max()
        .map_or(0, |max| max + 1)
}

/// Moves the sibling currently at `from` to `to` within one container.
///
/// Moving earlier shifts every sibling in `[to, from)` up by one; moving
/// later shifts every sibling in `(from, to]` down by one; the moved
/// item takes `to`. A `to == from` move is a successful no-op.
///
/// The caller guarantees `from` is an occupied position; the engine
/// validates only the target.
///
/// # Errors
///
/// Returns [`PositionError::OutOfBounds`] when `to` is not a valid index
/// into the current sibling count. No position is altered on error.
pub fn reorder_within<T: Positioned>(
    siblings: &mut [T],
    from: usize,
    to: usize,
) -> Result<(), PositionError> {
    if siblings.is_empty() || to >= siblings.len() {
        return Err(PositionError::OutOfBounds {
            requested: to,
            limit: siblings.len().saturating_sub(1),
        });
    }
    if to == from {
        return Ok(());
    }

    let moved = siblings.iter().position(|item| item.position() == from);
    for item in siblings.iter_mut() {
        let current = item.position();
        if current == from {
            continue;
        }
        if to < from && current >= to && current < from {
            item.set_position(current + 1);
        } else if to > from && current > from && current <= to {
            item.set_position(current - 1);
        }
    }
    if let Some(index) = moved
        && let Some(item) = siblings.get_mut(index)
    {
        item.set_position(to);
    }
    Ok(())
}

/// Closes the gap left by removing the sibling at `removed`: every
/// position greater than `removed` shifts down by one.
pub fn close_gap<T: Positioned>(siblings: &mut [T], removed: usize) {
    for item in siblings.iter_mut() {
        let current = item.position();
        if current > removed {
            item.set_position(current - 1);
        }
    }
}

/// Opens a gap at `at` for an incoming sibling: every position greater
/// than or equal to `at` shifts up by one.
pub fn open_gap<T: Positioned>(siblings: &mut [T], at: usize) {
    for item in siblings.iter_mut() {
        let current = item.position();
        if current >= at {
            item.set_position(current + 1);
        }
    }
}

/// Checks that `to` is a valid insertion index for a container that
/// currently holds `destination_len` siblings (the moved item is not yet
/// among them, so `to == destination_len` appends).
///
/// # Errors
///
/// Returns [`PositionError::OutOfBounds`] when `to > destination_len`.
pub const fn check_insertion(to: usize, destination_len: usize) -> Result<(), PositionError> {
    if to > destination_len {
        return Err(PositionError::OutOfBounds {
            requested: to,
            limit: destination_len,
        });
    }
    Ok(())
}

/// Returns true when `positions` is exactly `{0..len-1}`.
///
/// Debug aid for adapters and tests; aggregate operations maintain the
/// invariant by construction.
#[must_use]
pub fn is_dense(positions: &[usize]) -> bool {
    let mut seen = vec![false; positions.len()];
    for &position in positions {
        match seen.get_mut(position) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
