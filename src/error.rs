//! # Errors
//!
//! The run loop itself never fails; errors only surface during bring-up
//! and when callers address the display outside its buffer.

use thiserror_no_std::Error;

use crate::config::{DISPLAY_CAPACITY, MAX_TASKS};

/// Crate-wide error type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The scheduler's fixed task table has no free slot.
    #[error("task table is full (max: {max})")]
    TaskTableFull {
        /// Capacity of the task table
        max: usize,
    },

    /// A display write started beyond the end of the text buffer.
    #[error("display position {position} is outside the {capacity}-cell buffer")]
    PositionOutOfRange {
        /// Requested start position
        position: usize,
        /// Size of the display buffer
        capacity: usize,
    },

    /// The core peripherals singleton was already taken.
    #[error("core peripherals were already taken")]
    PeripheralsTaken,
}

impl Error {
    pub(crate) const fn task_table_full() -> Self {
        Self::TaskTableFull { max: MAX_TASKS }
    }

    pub(crate) const fn position_out_of_range(position: usize) -> Self {
        Self::PositionOutOfRange {
            position,
            capacity: DISPLAY_CAPACITY,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
