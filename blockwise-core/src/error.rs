//! Error types for the scheduling engine.
//!
//! Only malformed input is an error. A flexible task that finds no slot is a
//! normal outcome and never surfaces here.

use thiserror::Error;

/// A scheduling run was rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A fixed task has no start time to pin it to.
    #[error("fixed task '{title}' ({id}) is missing a start_time")]
    MissingStartTime { id: String, title: String },

    /// A task record violates a structural invariant.
    #[error("invalid task '{id}': {reason}")]
    InvalidTask { id: String, reason: String },
}

/// Goal expansion was rejected before any record was produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GoalError {
    #[error("total_minutes must be > 0 (got {0})")]
    NonPositiveTotal(i64),

    #[error("max_block_size must be > 0 (got {0})")]
    NonPositiveBlockSize(i64),

    #[error("rest_between must be >= 0 (got {0})")]
    NegativeRest(i64),

    #[error("end_date {end} is before start_date {start}")]
    InvertedRange { start: String, end: String },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Failure to parse a wall-clock or calendar value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid time '{0}' (expected HH:MM)")]
    Time(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    Date(String),

    #[error("unknown priority '{0}' (expected high, medium or low)")]
    Priority(String),
}
