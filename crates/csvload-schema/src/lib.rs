//! # csvload-schema
//!
//! Single-pass, bounded-state SQL schema inference over streaming CSV input.
//!
//! Each column carries a monotonically narrowing set of still-plausible SQL
//! types plus a handful of counters; any prefix of the stream (or all of it)
//! can be analysed without materializing the file. The result is a list of
//! [`InferredColumn`]s with a chosen SQL type, precision/scale, max length,
//! nullability and unicode-ness, plus helpers to turn that into reader
//! column types or a `CREATE TABLE` statement.
//!
//! ## Example
//!
//! ```rust,no_run
//! use csvload_reader::CsvConfig;
//! use csvload_schema::{create_table_sql, SchemaInference};
//!
//! fn main() -> Result<(), csvload_reader::Error> {
//!     let columns = SchemaInference::new(CsvConfig::default())
//!         .sample_rows(1000)
//!         .run_path("orders.csv", None)?;
//!     println!("{}", create_table_sql(&columns, "orders", "dbo"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod analyzer;
pub mod ddl;
pub mod inference;

pub use analyzer::{ColumnTypeAnalyzer, InferredColumn, Possible};
pub use ddl::{create_table_sql, to_column_types};
pub use inference::{infer_full, infer_sample, SchemaInference};
