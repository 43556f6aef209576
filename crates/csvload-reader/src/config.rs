//! Reader configuration.

use csvload_parse::{Compression, QuoteMode};
use csvload_types::{ConverterRegistry, Culture, SqlValue, TargetType};

use crate::column::StaticColumn;
use crate::error::{Error, Result};

/// Field trimming policy, applied with respect to quoting provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// No trimming.
    #[default]
    None,
    /// Trim fields that were not quoted in the source.
    UnquotedOnly,
    /// Trim fields that were quoted in the source.
    QuotedOnly,
    /// Trim every field.
    All,
}

/// Disposition for duplicate header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateHeaderAction {
    /// Any repeated name is fatal at initialization.
    #[default]
    Throw,
    /// The k-th occurrence (k >= 2) becomes `name_k`.
    Rename,
    /// Later duplicates are dropped; their source slots are skipped.
    UseFirstOccurrence,
    /// Earlier duplicates are renamed; the last keeps the bare name.
    UseLastOccurrence,
}

/// Disposition for rows whose raw field count differs from the expected
/// width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchAction {
    /// Any difference is a row-level error.
    #[default]
    Throw,
    /// Missing fields are appended as nulls; extra fields still error.
    PadWithNulls,
    /// Extra fields are dropped; missing fields still error.
    TruncateExtra,
    /// Pad missing and drop extra.
    PadOrTruncate,
}

/// Disposition for row-level parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorAction {
    /// Propagate the error to the caller.
    #[default]
    Throw,
    /// Drop the row and continue with the next line.
    SkipRow,
    /// Invoke the subscribed handler, whose return governs this error only.
    /// Without a handler this degrades to `Throw`.
    RaiseEvent,
}

/// Complete reader configuration.
///
/// Fields are public and a `#[must_use]` builder method exists for each, so
/// configurations compose either way. [`CsvConfig::validate`] runs at reader
/// construction.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// First non-skipped line is a header. Default: true.
    pub has_header: bool,
    /// Leading logical lines discarded before the header. Default: 0.
    pub skip_rows: u32,
    /// Field separator, one or more characters. Default: `,`.
    pub delimiter: String,
    /// Quote character. Default: `"`.
    pub quote: char,
    /// Escape character for quotes inside a quoted field. Default: `"`.
    pub escape: char,
    /// Lines starting with this character are skipped. Default: `#`.
    pub comment: char,
    /// Trimming policy. Default: [`TrimPolicy::None`].
    pub trim: TrimPolicy,
    /// Read buffer size in bytes, at least 128. Default: 4096.
    pub buffer_size: usize,
    /// WHATWG encoding label. Default: `utf-8` (BOM-detected).
    pub encoding: String,
    /// Literal text meaning null. Default: none.
    pub null_value: Option<String>,
    /// Row-level error disposition. Default: [`ParseErrorAction::Throw`].
    pub parse_error_action: ParseErrorAction,
    /// Skip empty logical lines. Default: true.
    pub skip_empty_lines: bool,
    /// Quoted fields may span physical lines. Default: true.
    pub allow_multiline_fields: bool,
    /// Cap on characters inside one open quote (0 = unlimited). Default: 0.
    pub max_quoted_field_length: usize,
    /// Compression handling. Default: [`Compression::Auto`].
    pub compression: Compression,
    /// Decompression budget in bytes (0 = unlimited). Default: 0.
    pub max_decompressed_size: u64,
    /// Converter registry. Default: [`ConverterRegistry::default`].
    pub registry: ConverterRegistry,
    /// Substitute column defaults for nulls globally. Default: false.
    pub use_column_defaults: bool,
    /// Synthetic columns appended after the mapped columns.
    pub static_columns: Vec<StaticColumn>,
    /// Name-to-target-type assignments, matched case-insensitively.
    pub column_types: Vec<(String, TargetType)>,
    /// Per-column default values, matched case-insensitively.
    pub column_defaults: Vec<(String, SqlValue)>,
    /// Custom datetime patterns tried before the standard list.
    pub datetime_formats: Vec<String>,
    /// Collect row-level errors into a snapshot. Default: false.
    pub collect_parse_errors: bool,
    /// Error-collector ceiling (0 = unlimited). Default: 0.
    pub max_parse_errors: u32,
    /// Keep only these columns (case-insensitive), when non-empty.
    pub include_columns: Vec<String>,
    /// Drop these columns (case-insensitive).
    pub exclude_columns: Vec<String>,
    /// Distinguish quoted empties from unquoted empties. Default: false.
    pub distinguish_empty_from_null: bool,
    /// Duplicate header disposition. Default: [`DuplicateHeaderAction::Throw`].
    pub duplicate_header_action: DuplicateHeaderAction,
    /// Number/date parsing culture. Default: invariant.
    pub culture: Culture,
    /// Quote interpretation mode. Default: [`QuoteMode::Strict`].
    pub quote_mode: QuoteMode,
    /// Field-count mismatch disposition. Default: [`MismatchAction::Throw`].
    pub mismatched_field_action: MismatchAction,
    /// Rewrite smart quotes to ASCII before splitting. Default: false.
    pub normalize_quotes: bool,
    /// Prefix for auto-generated column names. Default: `Column`.
    pub default_header_name: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            skip_rows: 0,
            delimiter: ",".to_string(),
            quote: '"',
            escape: '"',
            comment: '#',
            trim: TrimPolicy::None,
            buffer_size: 4096,
            encoding: "utf-8".to_string(),
            null_value: None,
            parse_error_action: ParseErrorAction::Throw,
            skip_empty_lines: true,
            allow_multiline_fields: true,
            max_quoted_field_length: 0,
            compression: Compression::Auto,
            max_decompressed_size: 0,
            registry: ConverterRegistry::default(),
            use_column_defaults: false,
            static_columns: Vec::new(),
            column_types: Vec::new(),
            column_defaults: Vec::new(),
            datetime_formats: Vec::new(),
            collect_parse_errors: false,
            max_parse_errors: 0,
            include_columns: Vec::new(),
            exclude_columns: Vec::new(),
            distinguish_empty_from_null: false,
            duplicate_header_action: DuplicateHeaderAction::Throw,
            culture: Culture::invariant(),
            quote_mode: QuoteMode::Strict,
            mismatched_field_action: MismatchAction::Throw,
            normalize_quotes: false,
            default_header_name: "Column".to_string(),
        }
    }
}

impl CsvConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the first non-skipped line is a header.
    #[must_use]
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the number of leading logical lines to discard.
    #[must_use]
    pub fn skip_rows(mut self, skip_rows: u32) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Set the field separator.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the quote character.
    #[must_use]
    pub fn quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Set the escape character.
    #[must_use]
    pub fn escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    /// Set the comment character.
    #[must_use]
    pub fn comment(mut self, comment: char) -> Self {
        self.comment = comment;
        self
    }

    /// Set the trimming policy.
    #[must_use]
    pub fn trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }

    /// Set the read buffer size.
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the text encoding label.
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the literal text meaning null.
    #[must_use]
    pub fn null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = Some(null_value.into());
        self
    }

    /// Set the row-level error disposition.
    #[must_use]
    pub fn parse_error_action(mut self, action: ParseErrorAction) -> Self {
        self.parse_error_action = action;
        self
    }

    /// Set whether empty logical lines are skipped.
    #[must_use]
    pub fn skip_empty_lines(mut self, skip: bool) -> Self {
        self.skip_empty_lines = skip;
        self
    }

    /// Set whether quoted fields may span physical lines.
    #[must_use]
    pub fn allow_multiline_fields(mut self, allow: bool) -> Self {
        self.allow_multiline_fields = allow;
        self
    }

    /// Cap the characters accumulated inside one open quote.
    #[must_use]
    pub fn max_quoted_field_length(mut self, max: usize) -> Self {
        self.max_quoted_field_length = max;
        self
    }

    /// Set the compression handling.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the decompression budget.
    #[must_use]
    pub fn max_decompressed_size(mut self, max: u64) -> Self {
        self.max_decompressed_size = max;
        self
    }

    /// Replace the converter registry.
    #[must_use]
    pub fn registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable default-for-null substitution globally.
    #[must_use]
    pub fn use_column_defaults(mut self, use_defaults: bool) -> Self {
        self.use_column_defaults = use_defaults;
        self
    }

    /// Append a static column.
    #[must_use]
    pub fn static_column(mut self, column: StaticColumn) -> Self {
        self.static_columns.push(column);
        self
    }

    /// Assign a target type to a named column.
    #[must_use]
    pub fn column_type(mut self, name: impl Into<String>, target_type: TargetType) -> Self {
        self.column_types.push((name.into(), target_type));
        self
    }

    /// Assign a default value to a named column.
    #[must_use]
    pub fn column_default(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.column_defaults.push((name.into(), value.into()));
        self
    }

    /// Set custom datetime patterns, tried before the standard list.
    #[must_use]
    pub fn datetime_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Enable parse-error collection with an optional ceiling.
    #[must_use]
    pub fn collect_parse_errors(mut self, max_parse_errors: u32) -> Self {
        self.collect_parse_errors = true;
        self.max_parse_errors = max_parse_errors;
        self
    }

    /// Keep only the named columns.
    #[must_use]
    pub fn include_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Drop the named columns.
    #[must_use]
    pub fn exclude_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Distinguish quoted empties (empty string) from unquoted empties (null).
    #[must_use]
    pub fn distinguish_empty_from_null(mut self, distinguish: bool) -> Self {
        self.distinguish_empty_from_null = distinguish;
        self
    }

    /// Set the duplicate header disposition.
    #[must_use]
    pub fn duplicate_header_action(mut self, action: DuplicateHeaderAction) -> Self {
        self.duplicate_header_action = action;
        self
    }

    /// Set the number/date parsing culture.
    #[must_use]
    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Set the quote interpretation mode.
    #[must_use]
    pub fn quote_mode(mut self, mode: QuoteMode) -> Self {
        self.quote_mode = mode;
        self
    }

    /// Set the field-count mismatch disposition.
    #[must_use]
    pub fn mismatched_field_action(mut self, action: MismatchAction) -> Self {
        self.mismatched_field_action = action;
        self
    }

    /// Rewrite smart quotes to ASCII before splitting.
    #[must_use]
    pub fn normalize_quotes(mut self, normalize: bool) -> Self {
        self.normalize_quotes = normalize;
        self
    }

    /// Set the prefix for auto-generated column names.
    #[must_use]
    pub fn default_header_name(mut self, prefix: impl Into<String>) -> Self {
        self.default_header_name = prefix.into();
        self
    }

    /// Check structural constraints that cannot be enforced by types.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(Error::Config("delimiter must not be empty".to_string()));
        }
        if self.delimiter.contains(self.quote) {
            return Err(Error::Config(
                "delimiter must not contain the quote character".to_string(),
            ));
        }
        if self.buffer_size < 128 {
            return Err(Error::Config(format!(
                "buffer_size must be at least 128, got {}",
                self.buffer_size
            )));
        }
        if self.default_header_name.trim().is_empty() {
            return Err(Error::Config(
                "default_header_name must not be empty or whitespace".to_string(),
            ));
        }
        Ok(())
    }

    /// The registry with the configured datetime formats folded in.
    #[must_use]
    pub(crate) fn effective_registry(&self) -> ConverterRegistry {
        if self.datetime_formats.is_empty() {
            self.registry.clone()
        } else {
            self.registry
                .clone()
                .with_datetime_formats(self.datetime_formats.clone())
        }
    }
}
