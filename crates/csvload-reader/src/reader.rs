//! The pull-based CSV reader facade.
//!
//! `CsvReader` composes the framing layers (compression probe, text decoder,
//! line scanner, field splitter) with header resolution, record adaptation
//! and the row-level error policy, and exposes typed positional access to
//! the current record.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use csvload_parse::{
    normalize_smart_quotes, open_stream, split_line, LineScanner, LogicalLine, ScanOptions,
    SplitOptions, SplitResult, TextDecoder,
};
use csvload_parse::BufferPool;
use csvload_types::{SqlValue, TargetType, TypeError};

use crate::cancel::CancelToken;
use crate::column::SchemaColumn;
use crate::config::CsvConfig;
use crate::error::{Error, ParseError, Result};
use crate::header::{columns_from_width, resolve_header};
use crate::policy::{Disposition, ErrorHandler, ParseErrorPolicy};
use crate::record::RecordAdapter;

/// A peeked data row, replayed by the next `read()`.
struct PendingRow {
    split: SplitResult,
    end_line: u64,
    raw: String,
}

/// Streaming typed CSV reader.
///
/// A single reader is single-owner: `read()` advances it and the current
/// record is re-used between calls, so consumers copy what they keep.
/// Independent readers share nothing mutable and may run in parallel.
pub struct CsvReader {
    scanner: LineScanner,
    split_opts: SplitOptions,
    config: CsvConfig,
    pool: BufferPool,
    adapter: Option<RecordAdapter>,
    schema: Vec<SchemaColumn>,
    record: Vec<SqlValue>,
    policy: ParseErrorPolicy,
    cancel: Option<CancelToken>,
    pending: Option<PendingRow>,
    current_index: Option<u64>,
    next_index: u64,
    line_number: u64,
    at_eof: bool,
    closed: bool,
}

impl CsvReader {
    /// Open a file with the given configuration.
    pub fn open(path: impl AsRef<Path>, config: CsvConfig) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(Error::from)?;
        Self::from_reader(file, config)
    }

    /// Read from any byte source with the given configuration.
    pub fn from_reader(input: impl Read + Send + 'static, config: CsvConfig) -> Result<Self> {
        Self::with_pool(input, config, BufferPool::new())
    }

    /// Read from any byte source, leasing buffers from an existing pool.
    pub fn with_pool(
        input: impl Read + Send + 'static,
        config: CsvConfig,
        pool: BufferPool,
    ) -> Result<Self> {
        config.validate()?;
        let decoder = TextDecoder::for_label(&config.encoding)?;
        let stream = open_stream(
            Box::new(input),
            config.compression,
            config.max_decompressed_size,
        )?;
        let scan_opts = ScanOptions {
            quote: config.quote,
            escape: config.escape,
            allow_multiline_fields: config.allow_multiline_fields,
            max_quoted_field_length: config.max_quoted_field_length,
            buffer_size: config.buffer_size,
        };
        let scanner = LineScanner::new(stream, decoder, scan_opts, &pool);
        let split_opts = SplitOptions {
            delimiter: config.delimiter.clone(),
            quote: config.quote,
            escape: config.escape,
            mode: config.quote_mode,
        };
        let policy = ParseErrorPolicy::new(
            config.parse_error_action,
            config.collect_parse_errors,
            config.max_parse_errors,
        );
        tracing::debug!(
            delimiter = %config.delimiter,
            has_header = config.has_header,
            quote_mode = ?config.quote_mode,
            "reader constructed"
        );
        Ok(Self {
            scanner,
            split_opts,
            config,
            pool,
            adapter: None,
            schema: Vec::new(),
            record: Vec::new(),
            policy,
            cancel: None,
            pending: None,
            current_index: None,
            next_index: 0,
            line_number: 0,
            at_eof: false,
            closed: false,
        })
    }

    /// Install a cancellation token, checked at the start of each `read()`.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    /// Subscribe the `RaiseEvent` error handler.
    pub fn set_error_handler(&mut self, handler: ErrorHandler) {
        self.policy.set_handler(handler);
    }

    /// The buffer pool this reader leases from.
    #[must_use]
    pub fn buffer_pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Advance to the next record. Returns `false` at end of stream.
    pub fn read(&mut self) -> Result<bool> {
        if self.closed || self.at_eof {
            return Ok(false);
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.close();
            return Err(Error::Cancelled);
        }
        self.ensure_initialized()?;
        loop {
            let (split, end_line, raw) = match self.pending.take() {
                Some(pending) => (pending.split, pending.end_line, pending.raw),
                None => {
                    let Some(line) = self.next_meaningful_line()? else {
                        self.at_eof = true;
                        return Ok(false);
                    };
                    let split = {
                        let text = effective_text(&line.text, self.config.normalize_quotes);
                        split_line(&text, &self.split_opts)
                    };
                    (split, line.end_line, line.text)
                }
            };
            let Some(adapter) = self.adapter.as_ref() else {
                return Ok(false);
            };
            let outcome = adapter.adapt(
                &split.fields,
                split.unterminated,
                self.next_index,
                end_line,
                &raw,
                &mut self.record,
            );
            match outcome {
                Ok(()) => {
                    self.current_index = Some(self.next_index);
                    self.next_index += 1;
                    self.line_number = end_line;
                    return Ok(true);
                }
                Err(parse_error) => match self.policy.handle(parse_error) {
                    Disposition::SkipRow => continue,
                    Disposition::Fatal(error) => {
                        self.close();
                        return Err(error);
                    }
                },
            }
        }
    }

    /// Iterate owned copies of the remaining records.
    pub fn records(&mut self) -> Records<'_> {
        Records { reader: self }
    }

    /// Close the reader, returning the pooled buffer. Idempotent; further
    /// `read()` calls answer `false`.
    pub fn close(&mut self) {
        self.scanner.close();
        self.closed = true;
    }

    // ------------------------------------------------------------------
    // Schema surface
    // ------------------------------------------------------------------

    /// Visible record width: mapped columns plus static columns.
    ///
    /// On a not-yet-read headerless reader this peeks one data line.
    pub fn field_count(&mut self) -> Result<usize> {
        self.ensure_initialized()?;
        Ok(self.adapter.as_ref().map(RecordAdapter::width).unwrap_or(0))
    }

    /// Column name at an ordinal.
    pub fn name(&mut self, ordinal: usize) -> Result<Option<&str>> {
        self.ensure_initialized()?;
        Ok(self.schema.get(ordinal).map(|c| c.name.as_str()))
    }

    /// Ordinal of a column by case-insensitive name.
    pub fn ordinal(&mut self, name: &str) -> Result<Option<usize>> {
        self.ensure_initialized()?;
        Ok(self
            .schema
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.ordinal))
    }

    /// Whether a column with this name exists.
    pub fn has_column(&mut self, name: &str) -> Result<bool> {
        Ok(self.ordinal(name)?.is_some())
    }

    /// Target type at an ordinal.
    pub fn field_type(&mut self, ordinal: usize) -> Result<Option<TargetType>> {
        self.ensure_initialized()?;
        Ok(self.schema.get(ordinal).map(|c| c.target_type))
    }

    /// The schema descriptor for the visible record.
    pub fn schema(&mut self) -> Result<&[SchemaColumn]> {
        self.ensure_initialized()?;
        Ok(&self.schema)
    }

    /// Assign a target type to a named column. Returns whether a column
    /// matched; conversions apply from the next `read()` on.
    pub fn set_column_type(&mut self, name: &str, target_type: TargetType) -> Result<bool> {
        self.ensure_initialized()?;
        let Some(adapter) = self.adapter.as_mut() else {
            return Ok(false);
        };
        let mut found = false;
        for column in adapter.columns_mut() {
            if column.name.eq_ignore_ascii_case(name) {
                column.target_type = target_type;
                found = true;
            }
        }
        if found {
            let mapped = adapter.columns().len();
            for schema_column in self.schema.iter_mut().take(mapped) {
                if schema_column.name.eq_ignore_ascii_case(name) {
                    schema_column.target_type = target_type;
                }
            }
        }
        Ok(found)
    }

    // ------------------------------------------------------------------
    // Current record surface
    // ------------------------------------------------------------------

    /// The current record as a value slice.
    #[must_use]
    pub fn record(&self) -> &[SqlValue] {
        &self.record
    }

    /// The value at an ordinal of the current record.
    pub fn value(&self, ordinal: usize) -> Result<&SqlValue> {
        self.record.get(ordinal).ok_or_else(|| {
            Error::Type(TypeError::OrdinalOutOfRange {
                ordinal,
                width: self.record.len(),
            })
        })
    }

    /// Whether the value at an ordinal is NULL.
    pub fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.value(ordinal)?.is_null())
    }

    /// String at an ordinal; fails on NULL or a non-text value.
    pub fn get_str(&self, ordinal: usize) -> Result<&str> {
        typed(self.value(ordinal)?, SqlValue::as_str, "NVARCHAR")
    }

    /// Owned string at an ordinal.
    pub fn get_string(&self, ordinal: usize) -> Result<String> {
        self.get_str(ordinal).map(str::to_owned)
    }

    /// Boolean at an ordinal.
    pub fn get_bool(&self, ordinal: usize) -> Result<bool> {
        typed(self.value(ordinal)?, SqlValue::as_bool, "BIT")
    }

    /// 32-bit integer at an ordinal.
    pub fn get_i32(&self, ordinal: usize) -> Result<i32> {
        typed(self.value(ordinal)?, SqlValue::as_i32, "INT")
    }

    /// 64-bit integer at an ordinal; INT widens.
    pub fn get_i64(&self, ordinal: usize) -> Result<i64> {
        typed(self.value(ordinal)?, SqlValue::as_i64, "BIGINT")
    }

    /// Double at an ordinal.
    pub fn get_f64(&self, ordinal: usize) -> Result<f64> {
        typed(self.value(ordinal)?, SqlValue::as_f64, "FLOAT")
    }

    /// Exact decimal at an ordinal; MONEY qualifies.
    pub fn get_decimal(&self, ordinal: usize) -> Result<rust_decimal::Decimal> {
        typed(self.value(ordinal)?, SqlValue::as_decimal, "DECIMAL")
    }

    /// Date-time at an ordinal.
    pub fn get_datetime(&self, ordinal: usize) -> Result<chrono::NaiveDateTime> {
        typed(self.value(ordinal)?, SqlValue::as_datetime, "DATETIME2")
    }

    /// UUID at an ordinal.
    pub fn get_uuid(&self, ordinal: usize) -> Result<uuid::Uuid> {
        typed(self.value(ordinal)?, SqlValue::as_uuid, "UNIQUEIDENTIFIER")
    }

    /// Float vector at an ordinal.
    pub fn get_vector(&self, ordinal: usize) -> Result<&[f32]> {
        typed(self.value(ordinal)?, SqlValue::as_vector, "VECTOR")
    }

    /// Copy the current record into `buf`, returning how many values were
    /// copied.
    pub fn get_values(&self, buf: &mut [SqlValue]) -> usize {
        let n = self.record.len().min(buf.len());
        for (slot, value) in buf.iter_mut().zip(self.record.iter()) {
            *slot = value.clone();
        }
        n
    }

    /// 0-based index of the current record; `None` before the first read.
    #[must_use]
    pub fn record_index(&self) -> Option<u64> {
        self.current_index
    }

    /// 1-based physical line number the current record ended on; 0 before
    /// the first read.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Snapshot of collected row-level errors.
    #[must_use]
    pub fn parse_errors(&self) -> &[ParseError] {
        self.policy.errors()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.adapter.is_some() {
            return Ok(());
        }
        for _ in 0..self.config.skip_rows {
            if self.next_raw_line()?.is_none() {
                break;
            }
        }
        let (columns, source_width) = if self.config.has_header {
            match self.next_meaningful_line()? {
                Some(line) => {
                    let split = {
                        let text = effective_text(&line.text, self.config.normalize_quotes);
                        split_line(&text, &self.split_opts)
                    };
                    (resolve_header(&split.fields, &self.config)?, split.fields.len())
                }
                None => (Vec::new(), 0),
            }
        } else {
            match self.next_meaningful_line()? {
                Some(line) => {
                    let split = {
                        let text = effective_text(&line.text, self.config.normalize_quotes);
                        split_line(&text, &self.split_opts)
                    };
                    let width = split.fields.len();
                    let columns = columns_from_width(width, &self.config);
                    self.pending = Some(PendingRow {
                        split,
                        end_line: line.end_line,
                        raw: line.text,
                    });
                    (columns, width)
                }
                None => (Vec::new(), 0),
            }
        };
        let adapter = RecordAdapter::new(columns, &self.config, source_width);
        self.schema = build_schema(&adapter);
        self.adapter = Some(adapter);
        Ok(())
    }

    fn next_raw_line(&mut self) -> Result<Option<LogicalLine>> {
        match self.scanner.next_line() {
            Ok(line) => Ok(line),
            Err(stream_error) => {
                self.close();
                Err(stream_error.into())
            }
        }
    }

    /// Next logical line that is neither a comment nor a skipped empty.
    fn next_meaningful_line(&mut self) -> Result<Option<LogicalLine>> {
        loop {
            let Some(line) = self.next_raw_line()? else {
                return Ok(None);
            };
            if line.text.starts_with(self.config.comment) {
                continue;
            }
            if self.config.skip_empty_lines && line.text.is_empty() {
                continue;
            }
            return Ok(Some(line));
        }
    }
}

impl std::fmt::Debug for CsvReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvReader")
            .field("record_index", &self.current_index)
            .field("line_number", &self.line_number)
            .field("columns", &self.schema.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Drop for CsvReader {
    fn drop(&mut self) {
        // Returns the pooled buffer even when the reader was never closed.
        self.close();
    }
}

/// Iterator over owned record copies; ends at EOF or after a fatal error.
pub struct Records<'a> {
    reader: &'a mut CsvReader,
}

impl Iterator for Records<'_> {
    type Item = Result<Vec<SqlValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read() {
            Ok(true) => Some(Ok(self.reader.record().to_vec())),
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

fn effective_text(text: &str, normalize: bool) -> Cow<'_, str> {
    if normalize {
        normalize_smart_quotes(text)
    } else {
        Cow::Borrowed(text)
    }
}

fn typed<'a, T>(
    value: &'a SqlValue,
    get: impl FnOnce(&'a SqlValue) -> Option<T>,
    expected: &'static str,
) -> Result<T> {
    if value.is_null() {
        return Err(Error::Type(TypeError::UnexpectedNull));
    }
    get(value).ok_or_else(|| {
        Error::Type(TypeError::TypeMismatch {
            expected,
            actual: value.type_name().to_string(),
        })
    })
}

fn build_schema(adapter: &RecordAdapter) -> Vec<SchemaColumn> {
    let mut schema: Vec<SchemaColumn> = adapter
        .columns()
        .iter()
        .map(|c| SchemaColumn {
            name: c.name.clone(),
            ordinal: c.ordinal,
            target_type: c.target_type,
            allow_null: c.allow_null,
        })
        .collect();
    let base = schema.len();
    for (i, static_column) in adapter.static_columns().iter().enumerate() {
        schema.push(SchemaColumn {
            name: static_column.name.clone(),
            ordinal: base + i,
            target_type: static_column.target_type,
            allow_null: false,
        });
    }
    schema
}
