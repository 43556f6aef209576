//! Per-column incremental type analysis.
//!
//! Each analyzer starts with every SQL type plausible and narrows as values
//! arrive; a bit, once cleared, is never re-tested. Text always remains
//! plausible, so finalization can never fail.

use bitflags::bitflags;

use csvload_types::convert::{parse_bigint, parse_decimal, parse_guid, parse_int};
use csvload_types::{decimal_digits, ConverterRegistry, Culture};

/// Thresholds above which text columns switch to `(max)` sizing.
const VARCHAR_MAX_THRESHOLD: usize = 8000;
const NVARCHAR_MAX_THRESHOLD: usize = 4000;

/// SQL decimal precision ceiling.
const MAX_DECIMAL_PRECISION: u32 = 38;

bitflags! {
    /// Still-plausible SQL types for a column. Text is implicit and always
    /// plausible.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Possible: u8 {
        /// UNIQUEIDENTIFIER remains plausible.
        const GUID = 0x01;
        /// INT remains plausible.
        const INT = 0x02;
        /// BIGINT remains plausible.
        const BIGINT = 0x04;
        /// DECIMAL remains plausible.
        const DECIMAL = 0x08;
        /// BIT remains plausible.
        const BOOL = 0x10;
        /// DATETIME2 remains plausible.
        const DATETIME = 0x20;
    }
}

/// One column's inferred shape after analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredColumn {
    /// Column name.
    pub name: String,
    /// Position in the analysed record.
    pub ordinal: usize,
    /// Chosen SQL type, spelled out (e.g. `decimal(4,2)`, `nvarchar(120)`).
    pub sql_type: String,
    /// Longest observed value in characters.
    pub max_length: usize,
    /// Whether any null (empty) value was observed.
    pub is_nullable: bool,
    /// Whether any code point above U+007F was observed.
    pub is_unicode: bool,
    /// Decimal precision (0 for non-decimal types).
    pub precision: u32,
    /// Decimal scale (0 for non-decimal types).
    pub scale: u32,
    /// Values observed, nulls included.
    pub total_count: u64,
    /// Values observed that were not null.
    pub non_null_count: u64,
}

/// Incremental single-column type analyzer.
#[derive(Debug)]
pub struct ColumnTypeAnalyzer {
    name: String,
    ordinal: usize,
    possible: Possible,
    registry: ConverterRegistry,
    culture: Culture,
    total: u64,
    nulls: u64,
    max_len: usize,
    has_unicode: bool,
    max_int_digits: u32,
    max_scale: u32,
}

impl ColumnTypeAnalyzer {
    /// Create an analyzer for one column.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ordinal: usize,
        registry: ConverterRegistry,
        culture: Culture,
    ) -> Self {
        Self {
            name: name.into(),
            ordinal,
            possible: Possible::all(),
            registry,
            culture,
            total: 0,
            nulls: 0,
            max_len: 0,
            has_unicode: false,
            max_int_digits: 0,
            max_scale: 0,
        }
    }

    /// The still-plausible type set; monotonically non-increasing.
    #[must_use]
    pub fn possible(&self) -> Possible {
        self.possible
    }

    /// The record ordinal this analyzer watches.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Feed one raw value. Empty or whitespace-only input counts as null
    /// and narrows nothing.
    pub fn add(&mut self, value: &str) {
        self.total += 1;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.nulls += 1;
            return;
        }
        self.max_len = self.max_len.max(trimmed.chars().count());
        if !self.has_unicode && trimmed.chars().any(|c| (c as u32) > 127) {
            self.has_unicode = true;
        }

        // Integer types are tested before bool on purpose: "0" and "1"
        // satisfy both, and the integer lattice is stricter.
        if self.possible.contains(Possible::GUID) && parse_guid(trimmed).is_none() {
            self.possible.remove(Possible::GUID);
        }
        if self.possible.contains(Possible::INT) && parse_int(trimmed, &self.culture).is_none() {
            self.possible.remove(Possible::INT);
        }
        if self.possible.contains(Possible::BIGINT)
            && parse_bigint(trimmed, &self.culture).is_none()
        {
            self.possible.remove(Possible::BIGINT);
        }
        if self.possible.contains(Possible::DECIMAL) {
            match parse_decimal(trimmed, &self.culture) {
                Some(value) => {
                    let (int_digits, scale) = decimal_digits(&value);
                    self.max_int_digits = self.max_int_digits.max(int_digits);
                    self.max_scale = self.max_scale.max(scale);
                }
                None => self.possible.remove(Possible::DECIMAL),
            }
        }
        if self.possible.contains(Possible::BOOL) && self.registry.parse_bool(trimmed).is_none() {
            self.possible.remove(Possible::BOOL);
        }
        if self.possible.contains(Possible::DATETIME)
            && self.registry.parse_datetime(trimmed).is_none()
        {
            self.possible.remove(Possible::DATETIME);
        }
    }

    /// Choose the final SQL type.
    #[must_use]
    pub fn finalize(&self) -> InferredColumn {
        let non_null = self.total - self.nulls;
        let mut precision = 0;
        let mut scale = 0;

        let sql_type = if non_null == 0 {
            // Nothing to narrow on: the safest loadable shape.
            "varchar(1)".to_string()
        } else if self.possible.contains(Possible::GUID) {
            "uniqueidentifier".to_string()
        } else if self.possible.contains(Possible::INT) {
            "int".to_string()
        } else if self.possible.contains(Possible::BIGINT) {
            "bigint".to_string()
        } else if self.possible.contains(Possible::DECIMAL) {
            // Integral decimals (e.g. scientific notation inputs) prefer an
            // integer type when the digits fit.
            if self.max_scale == 0 && self.max_int_digits <= 9 {
                "int".to_string()
            } else if self.max_scale == 0 && self.max_int_digits <= 18 {
                "bigint".to_string()
            } else {
                precision = (self.max_int_digits + self.max_scale).clamp(1, MAX_DECIMAL_PRECISION);
                scale = self.max_scale.clamp(0, precision);
                format!("decimal({precision},{scale})")
            }
        } else if self.possible.contains(Possible::BOOL) {
            "bit".to_string()
        } else if self.possible.contains(Possible::DATETIME) {
            "datetime2".to_string()
        } else {
            text_type(self.max_len, self.has_unicode)
        };

        InferredColumn {
            name: self.name.clone(),
            ordinal: self.ordinal,
            sql_type,
            max_length: if non_null == 0 { 1 } else { self.max_len.max(1) },
            is_nullable: self.nulls > 0,
            is_unicode: self.has_unicode,
            precision,
            scale,
            total_count: self.total,
            non_null_count: non_null,
        }
    }
}

fn text_type(max_len: usize, unicode: bool) -> String {
    let n = max_len.max(1);
    if unicode {
        if max_len > NVARCHAR_MAX_THRESHOLD {
            "nvarchar(max)".to_string()
        } else {
            format!("nvarchar({n})")
        }
    } else if max_len > VARCHAR_MAX_THRESHOLD {
        "varchar(max)".to_string()
    } else {
        format!("varchar({n})")
    }
}
