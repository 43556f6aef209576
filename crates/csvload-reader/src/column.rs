//! Column descriptors.

use std::sync::Arc;

use csvload_types::{CustomConverter, SqlValue, TargetType};

/// A consumer-visible column mapped from the source fields.
#[derive(Clone)]
pub struct Column {
    /// Column name, unique within the record.
    pub name: String,
    /// Position in the consumer-visible record.
    pub ordinal: usize,
    /// Position in the raw split fields; differs from `ordinal` when columns
    /// are excluded or duplicates collapsed.
    pub source_index: usize,
    /// Conversion target.
    pub target_type: TargetType,
    /// Whether the column reports as nullable in the schema descriptor.
    pub allow_null: bool,
    /// Value substituted for null when [`Column::use_default_for_null`] is set.
    pub default: Option<SqlValue>,
    /// Substitute [`Column::default`] for null inputs.
    pub use_default_for_null: bool,
    /// Per-column converter override; falls back to the registry when unset.
    pub converter: Option<CustomConverter>,
}

impl Column {
    /// Create a text column at the given positions.
    #[must_use]
    pub fn new(name: impl Into<String>, ordinal: usize, source_index: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
            source_index,
            target_type: TargetType::Text,
            allow_null: true,
            default: None,
            use_default_for_null: false,
            converter: None,
        }
    }

    /// Set the conversion target.
    #[must_use]
    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    /// Set nullability for the schema descriptor.
    #[must_use]
    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Set a default value and enable default-for-null substitution.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<SqlValue>) -> Self {
        self.default = Some(default.into());
        self.use_default_for_null = true;
        self
    }

    /// Set a per-column converter override.
    #[must_use]
    pub fn with_converter(mut self, converter: CustomConverter) -> Self {
        self.converter = Some(converter);
        self
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("ordinal", &self.ordinal)
            .field("source_index", &self.source_index)
            .field("target_type", &self.target_type)
            .field("allow_null", &self.allow_null)
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

/// How a static column produces its value.
#[derive(Clone)]
enum StaticValue {
    /// The same value on every row.
    Constant(SqlValue),
    /// The 0-based record index as a BIGINT.
    RowNumber,
    /// An arbitrary function of the 0-based record index.
    Computed(Arc<dyn Fn(u64) -> SqlValue + Send + Sync>),
}

/// A synthetic, always-present column.
///
/// Static columns are appended after the mapped columns and never
/// participate in field-count mismatch checks.
#[derive(Clone)]
pub struct StaticColumn {
    /// Column name.
    pub name: String,
    /// Reported target type.
    pub target_type: TargetType,
    value: StaticValue,
}

impl StaticColumn {
    /// A static column carrying the same value on every row.
    #[must_use]
    pub fn constant(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            target_type: target_of(&value),
            value: StaticValue::Constant(value),
        }
    }

    /// A static column carrying the 0-based record index.
    #[must_use]
    pub fn row_number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_type: TargetType::BigInt,
            value: StaticValue::RowNumber,
        }
    }

    /// A static column computed from the 0-based record index.
    #[must_use]
    pub fn computed(
        name: impl Into<String>,
        target_type: TargetType,
        f: impl Fn(u64) -> SqlValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            target_type,
            value: StaticValue::Computed(Arc::new(f)),
        }
    }

    /// Produce the value for one record.
    #[must_use]
    pub fn value_for(&self, record_index: u64) -> SqlValue {
        match &self.value {
            StaticValue::Constant(v) => v.clone(),
            StaticValue::RowNumber => SqlValue::BigInt(record_index as i64),
            StaticValue::Computed(f) => f(record_index),
        }
    }
}

impl std::fmt::Debug for StaticColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticColumn")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .finish()
    }
}

/// Plain schema descriptor exposed by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Column name.
    pub name: String,
    /// Position in the record.
    pub ordinal: usize,
    /// Conversion target.
    pub target_type: TargetType,
    /// Whether nulls may appear.
    pub allow_null: bool,
}

fn target_of(value: &SqlValue) -> TargetType {
    match value {
        SqlValue::Null | SqlValue::String(_) => TargetType::Text,
        SqlValue::Bit(_) => TargetType::Bit,
        SqlValue::Int(_) => TargetType::Int,
        SqlValue::BigInt(_) => TargetType::BigInt,
        SqlValue::Float(_) => TargetType::Float,
        SqlValue::Decimal(_) => TargetType::Decimal,
        SqlValue::Money(_) => TargetType::Money,
        SqlValue::DateTime(_) => TargetType::DateTime,
        SqlValue::Uuid(_) => TargetType::Guid,
        SqlValue::Vector(_) => TargetType::Vector,
    }
}
