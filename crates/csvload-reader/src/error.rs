//! Reader error types.

use std::sync::Arc;

use thiserror::Error;

use csvload_parse::StreamError;
use csvload_types::TypeError;

/// Convenience result alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Row-level parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unterminated quoted field in strict mode.
    MalformedQuoting,
    /// Raw field count differed from the expected width.
    FieldCountMismatch,
    /// A converter rejected a value for a typed column.
    ConversionFailure,
}

/// A row-level parse error with its source context.
///
/// Row-level errors are values, not unwinds: they are routed through the
/// configured error policy, which decides whether the row is skipped, the
/// error collected, or the read aborted.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// 0-based index the record would have had.
    pub record_index: u64,
    /// 1-based physical line number the row ended on.
    pub line_number: u64,
    /// The raw logical line, unsplit.
    pub raw_line: String,
    /// Offending column name, when the error is column-scoped.
    pub column: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {} (line {}): {}",
            self.record_index, self.line_number, self.message
        )
    }
}

/// Errors that can occur during reader operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying stream failure (wrapped in Arc for Clone support).
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// Undecodable bytes under the configured encoding.
    #[error("invalid byte sequence for encoding {0}")]
    Encoding(&'static str),

    /// The configured encoding label is not recognized.
    #[error("unsupported encoding label: {0}")]
    UnsupportedEncoding(String),

    /// Decompressed output exceeded the configured budget.
    #[error("decompressed size exceeds the configured limit of {limit} bytes")]
    DecompressionBomb {
        /// The configured budget in bytes.
        limit: u64,
    },

    /// A quoted field ran past the configured length cap.
    #[error("quoted field exceeds the configured maximum of {limit} characters")]
    QuotedFieldTooLong {
        /// The configured cap in characters.
        limit: usize,
    },

    /// Duplicate header name under the `Throw` policy.
    #[error("duplicate header name: {0}")]
    DuplicateHeader(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A row-level error escalated by the error policy.
    #[error("parse error: {0}")]
    Parse(ParseError),

    /// The parse-error collector reached its ceiling.
    #[error("parse error limit of {limit} reached")]
    MaxErrorsExceeded {
        /// The configured ceiling.
        limit: u32,
    },

    /// Cancellation token tripped.
    #[error("operation cancelled")]
    Cancelled,

    /// Typed accessor misuse.
    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl From<StreamError> for Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(inner) => Error::Io(Arc::new(inner)),
            StreamError::Encoding { encoding } => Error::Encoding(encoding),
            StreamError::UnsupportedEncoding(label) => Error::UnsupportedEncoding(label),
            StreamError::DecompressionBomb { limit } => Error::DecompressionBomb { limit },
            StreamError::QuotedFieldTooLong { limit } => Error::QuotedFieldTooLong { limit },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        StreamError::from(e).into()
    }
}
