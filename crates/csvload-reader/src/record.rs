//! Record adaptation: raw split fields to typed positional values.

use csvload_parse::Field;
use csvload_types::{ConverterRegistry, Culture, SqlValue, TargetType};

use crate::column::{Column, StaticColumn};
use crate::config::{CsvConfig, MismatchAction, TrimPolicy};
use crate::error::{ParseError, ParseErrorKind};

/// Trim `value` according to the policy, honouring quoting provenance.
pub(crate) fn apply_trim(value: &str, was_quoted: bool, policy: TrimPolicy) -> &str {
    match policy {
        TrimPolicy::None => value,
        TrimPolicy::All => value.trim(),
        TrimPolicy::UnquotedOnly => {
            if was_quoted {
                value
            } else {
                value.trim()
            }
        }
        TrimPolicy::QuotedOnly => {
            if was_quoted {
                value.trim()
            } else {
                value
            }
        }
    }
}

/// Turns one row of raw fields into the reader's positional record.
pub(crate) struct RecordAdapter {
    columns: Vec<Column>,
    static_columns: Vec<StaticColumn>,
    expected_width: usize,
    registry: ConverterRegistry,
    culture: Culture,
    trim: TrimPolicy,
    null_value: Option<String>,
    distinguish_empty_from_null: bool,
    mismatch: MismatchAction,
}

impl RecordAdapter {
    /// `source_width` is the raw field count of the line the columns were
    /// resolved from; dropped and excluded slots still count toward the
    /// expected row width.
    pub(crate) fn new(columns: Vec<Column>, config: &CsvConfig, source_width: usize) -> Self {
        let expected_width = columns
            .iter()
            .map(|c| c.source_index + 1)
            .max()
            .unwrap_or(0)
            .max(source_width);
        Self {
            columns,
            static_columns: config.static_columns.clone(),
            expected_width,
            registry: config.effective_registry(),
            culture: config.culture.clone(),
            trim: config.trim,
            null_value: config.null_value.clone(),
            distinguish_empty_from_null: config.distinguish_empty_from_null,
            mismatch: config.mismatched_field_action,
        }
    }

    pub(crate) fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub(crate) fn static_columns(&self) -> &[StaticColumn] {
        &self.static_columns
    }

    /// Visible record width: mapped columns plus static columns.
    pub(crate) fn width(&self) -> usize {
        self.columns.len() + self.static_columns.len()
    }

    /// Adapt one row into `out`. On a row-level error `out` is unspecified
    /// and the caller routes the error through its policy.
    pub(crate) fn adapt(
        &self,
        fields: &[Field],
        unterminated: bool,
        record_index: u64,
        line_number: u64,
        raw_line: &str,
        out: &mut Vec<SqlValue>,
    ) -> Result<(), ParseError> {
        let error = |kind, column: Option<String>, message: String| ParseError {
            kind,
            record_index,
            line_number,
            raw_line: raw_line.to_string(),
            column,
            message,
        };

        if unterminated {
            return Err(error(
                ParseErrorKind::MalformedQuoting,
                None,
                "unterminated quoted field".to_string(),
            ));
        }

        let pad_allowed = matches!(
            self.mismatch,
            MismatchAction::PadWithNulls | MismatchAction::PadOrTruncate
        );
        let truncate_allowed = matches!(
            self.mismatch,
            MismatchAction::TruncateExtra | MismatchAction::PadOrTruncate
        );
        if (fields.len() < self.expected_width && !pad_allowed)
            || (fields.len() > self.expected_width && !truncate_allowed)
        {
            return Err(error(
                ParseErrorKind::FieldCountMismatch,
                None,
                format!(
                    "expected {} fields, found {}",
                    self.expected_width,
                    fields.len()
                ),
            ));
        }

        out.clear();
        for column in &self.columns {
            // Missing slots read as padded empty unquoted fields.
            let (value, was_quoted) = fields
                .get(column.source_index)
                .map(|f| (f.value.as_str(), f.was_quoted))
                .unwrap_or(("", false));
            let trimmed = apply_trim(value, was_quoted, self.trim);

            let is_null_marker = self
                .null_value
                .as_deref()
                .is_some_and(|marker| trimmed == marker);
            let is_null = if is_null_marker {
                true
            } else if trimmed.is_empty() {
                if self.distinguish_empty_from_null {
                    // A quoted empty is an empty string, but only text can
                    // hold one; other targets read it as null.
                    !(was_quoted && column.target_type == TargetType::Text)
                } else {
                    true
                }
            } else {
                false
            };

            if is_null {
                if column.use_default_for_null {
                    out.push(column.default.clone().unwrap_or(SqlValue::Null));
                } else {
                    out.push(SqlValue::Null);
                }
                continue;
            }

            let converted = match &column.converter {
                Some(custom) => custom(trimmed, &self.culture),
                None => self.registry.convert(column.target_type, trimmed, &self.culture),
            };
            match converted {
                Some(value) => out.push(value),
                None => {
                    return Err(error(
                        ParseErrorKind::ConversionFailure,
                        Some(column.name.clone()),
                        format!(
                            "cannot convert {:?} to {} for column {}",
                            trimmed, column.target_type, column.name
                        ),
                    ));
                }
            }
        }
        for static_column in &self.static_columns {
            out.push(static_column.value_for(record_index));
        }
        Ok(())
    }
}
