//! # csvload-types
//!
//! The typed side of the csvload engine: the [`SqlValue`] sum type carried in
//! records, the closed [`TargetType`] register, culture descriptors for
//! number/date parsing, and the converter registry that turns field text into
//! values.
//!
//! ## Type Mappings
//!
//! | Target type | Rust representation | SQL spelling |
//! |-------------|---------------------|--------------|
//! | `Text` | `String` | `NVARCHAR`/`VARCHAR` |
//! | `Bit` | `bool` | `BIT` |
//! | `Int` | `i32` | `INT` |
//! | `BigInt` | `i64` | `BIGINT` |
//! | `Float` | `f64` | `FLOAT` |
//! | `Decimal` | `rust_decimal::Decimal` | `DECIMAL` |
//! | `Money` | `rust_decimal::Decimal` | `MONEY` |
//! | `DateTime` | `chrono::NaiveDateTime` | `DATETIME2` |
//! | `Guid` | `uuid::Uuid` | `UNIQUEIDENTIFIER` |
//! | `Vector` | `Vec<f32>` | `VECTOR` |
//!
//! The default [`ConverterRegistry`] is immutable; callers clone it and
//! customize the copy, so no process-wide mutable state exists.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod convert;
pub mod culture;
pub mod error;
pub mod target;
pub mod value;

pub use convert::{decimal_digits, ConverterRegistry, CustomConverter};
pub use culture::Culture;
pub use error::TypeError;
pub use target::TargetType;
pub use value::SqlValue;
