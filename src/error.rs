//! # Engine Errors
//!
//! Every fallible operation in the library returns [`MoonError`]. None of these
//! are transient: they describe bad input or a solver that did not settle, so
//! callers report them rather than retry.

use thiserror::Error;

/// Errors that can occur while computing lunar data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoonError {
    /// An iterative solver exceeded its iteration cap
    #[error("{routine} did not converge within {iterations} iterations")]
    NumericDivergence {
        routine: &'static str,
        iterations: usize,
    },

    /// Quarter name outside the fixed eight-entry set
    #[error("unknown phase quarter name: {0:?}")]
    UnknownQuarterName(String),

    /// The rise/set scan finished without seeing the requested crossing
    #[error("no moon{event} on {date}")]
    NoObservableEvent {
        event: &'static str,
        date: chrono::NaiveDate,
    },

    /// Unix timestamp outside the range chrono can represent
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    /// Calendar date that does not exist
    #[error("invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Latitude or longitude outside the geographic range
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
}
