//! Recoverable error types
//!
//! Fatal failures (file I/O, model training) travel as `anyhow::Error`;
//! the one error a caller is expected to recover from per-item is a
//! malformed scoring-request line, so it gets its own type.

use thiserror::Error;

/// A scoring-request line could not be parsed.
///
/// The read loop reports these per line and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestParseError {
    #[error("expected {expected} comma-separated fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("{field} is not an integer: '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
