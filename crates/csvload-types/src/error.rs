//! Type access error types.

use thiserror::Error;

/// Errors raised by typed access to record values.
#[derive(Debug, Clone, Error)]
pub enum TypeError {
    /// Value is null when non-null was expected.
    #[error("unexpected null value")]
    UnexpectedNull,

    /// The stored value is not of the requested type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        actual: String,
    },

    /// Ordinal outside the record width.
    #[error("ordinal {ordinal} out of range for a record of {width} columns")]
    OrdinalOutOfRange {
        /// Requested ordinal.
        ordinal: usize,
        /// Width of the record.
        width: usize,
    },
}
