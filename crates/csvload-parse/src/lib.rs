//! # csvload-parse
//!
//! Byte- and character-level framing for the csvload engine: compression
//! probing, text decoding, logical-line scanning and field splitting.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally policy-free. It knows nothing about headers,
//! column types or error-handling configuration; it turns a byte stream into
//! logical lines and logical lines into `(value, was_quoted)` fields, and it
//! leaves every decision about what those fields *mean* to higher layers.
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> open_stream (compression probe + bounded decompression)
//!       -> TextDecoder (BOM detection + streaming decode)
//!       -> LineScanner (logical lines; quoted fields may span physical lines)
//!       -> split_line  (fields with quoting provenance)
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod compression;
pub mod error;
pub mod pool;
pub mod scanner;
pub mod splitter;
pub mod text;

pub use compression::{open_stream, sniff, Compression};
pub use error::StreamError;
pub use pool::{BufferLease, BufferPool};
pub use scanner::{LineScanner, LogicalLine, ScanOptions};
pub use splitter::{
    normalize_smart_quotes, split_line, Field, QuoteMode, SplitOptions, SplitResult,
};
pub use text::TextDecoder;
