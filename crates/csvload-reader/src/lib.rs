//! # csvload-reader
//!
//! Streaming typed CSV reader for bulk-load pipelines.
//!
//! This is the primary public API surface for the csvload project. A
//! [`CsvReader`] pulls records from an arbitrary byte stream (possibly
//! compressed) and delivers them as typed positional values, suitable for
//! feeding a database bulk loader without materializing the file.
//!
//! ## Features
//!
//! - **Configurable framing**: multi-character delimiters, strict/lenient
//!   quoting, multi-line quoted fields, comment and empty-line skipping
//! - **Typed records**: per-column conversion through a cloneable converter
//!   registry, culture-aware numbers and dates, per-field null/empty
//!   distinction
//! - **Header policies**: duplicate-name resolution, include/exclude
//!   filters, synthetic names for headerless streams
//! - **Error policy**: row-level errors as values, collectable with a
//!   ceiling, skip/throw/event dispositions
//! - **Bounded resources**: pooled read buffers returned on every exit
//!   path, decompression and quoted-field budgets
//!
//! ## Example
//!
//! ```rust,no_run
//! use csvload_reader::{CsvConfig, CsvReader};
//! use csvload_types::TargetType;
//!
//! fn main() -> Result<(), csvload_reader::Error> {
//!     let config = CsvConfig::default()
//!         .column_type("Age", TargetType::Int);
//!     let mut reader = CsvReader::open("people.csv", config)?;
//!
//!     while reader.read()? {
//!         let name = reader.get_str(0)?;
//!         let age = reader.get_i32(1)?;
//!         println!("{name} is {age}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cancel;
pub mod column;
pub mod config;
pub mod error;
mod header;
pub mod policy;
pub mod reader;
mod record;

pub use cancel::CancelToken;
pub use column::{Column, SchemaColumn, StaticColumn};
pub use config::{
    CsvConfig, DuplicateHeaderAction, MismatchAction, ParseErrorAction, TrimPolicy,
};
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use policy::ErrorHandler;
pub use reader::{CsvReader, Records};

// The framing and type layers travel with the reader's API.
pub use csvload_parse::{Compression, QuoteMode};
pub use csvload_types::{ConverterRegistry, Culture, SqlValue, TargetType};
