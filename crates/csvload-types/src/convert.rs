//! Text-to-type conversion.
//!
//! Converters are total functions from field text to `Option<T>`; a `None`
//! is the caller's signal to raise a conversion failure against its error
//! policy. The registry is plain data: truth-token sets, datetime format
//! lists and per-target overrides. The default instance is immutable;
//! customization happens on a clone.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::culture::Culture;
use crate::target::TargetType;
use crate::value::SqlValue;

/// Per-column converter override carried in a column descriptor.
pub type CustomConverter = Arc<dyn Fn(&str, &Culture) -> Option<SqlValue> + Send + Sync>;

/// Standard datetime patterns, tried after any configured custom formats.
///
/// Longer patterns come first so compact inputs are not half-consumed; the
/// US month-first form is tried before the European day-first forms.
const STANDARD_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y",
    "%Y%m%d%H%M%S",
    "%Y%m%d",
];

/// Registry of text-to-value converters.
#[derive(Clone)]
pub struct ConverterRegistry {
    true_values: Vec<String>,
    false_values: Vec<String>,
    datetime_formats: Vec<String>,
    overrides: HashMap<TargetType, CustomConverter>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self {
            true_values: ["true", "yes", "y", "on", "t", "1"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            false_values: ["false", "no", "n", "off", "f", "0"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            datetime_formats: Vec::new(),
            overrides: HashMap::new(),
        }
    }
}

impl ConverterRegistry {
    /// Create the default registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the boolean truth-token sets.
    #[must_use]
    pub fn with_truth_values(
        mut self,
        true_values: &[&str],
        false_values: &[&str],
    ) -> Self {
        self.true_values = true_values.iter().map(ToString::to_string).collect();
        self.false_values = false_values.iter().map(ToString::to_string).collect();
        self
    }

    /// Set custom datetime patterns (chrono `strftime` syntax), tried before
    /// the standard list.
    #[must_use]
    pub fn with_datetime_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Install a converter override for one target type.
    #[must_use]
    pub fn with_override(mut self, target: TargetType, converter: CustomConverter) -> Self {
        self.overrides.insert(target, converter);
        self
    }

    /// Convert field text to a value of the target type.
    ///
    /// `None` means the converter rejected the input; null handling happens
    /// before this call, so `text` is never the null marker.
    #[must_use]
    pub fn convert(&self, target: TargetType, text: &str, culture: &Culture) -> Option<SqlValue> {
        if let Some(custom) = self.overrides.get(&target) {
            return custom(text, culture);
        }
        match target {
            TargetType::Text => Some(SqlValue::String(text.to_string())),
            TargetType::Bit => self.parse_bool(text).map(SqlValue::Bit),
            TargetType::Int => parse_int(text, culture).map(SqlValue::Int),
            TargetType::BigInt => parse_bigint(text, culture).map(SqlValue::BigInt),
            TargetType::Float => parse_float(text, culture).map(SqlValue::Float),
            TargetType::Decimal => parse_decimal(text, culture).map(SqlValue::Decimal),
            TargetType::Money => parse_money(text, culture).map(SqlValue::Money),
            TargetType::DateTime => self.parse_datetime(text).map(SqlValue::DateTime),
            TargetType::Guid => parse_guid(text).map(SqlValue::Uuid),
            TargetType::Vector => parse_vector(text).map(SqlValue::Vector),
        }
    }

    /// Parse a boolean against the registry's truth-token sets.
    #[must_use]
    pub fn parse_bool(&self, text: &str) -> Option<bool> {
        let t = text.trim();
        if self.true_values.iter().any(|v| v.eq_ignore_ascii_case(t)) {
            return Some(true);
        }
        if self.false_values.iter().any(|v| v.eq_ignore_ascii_case(t)) {
            return Some(false);
        }
        None
    }

    /// Parse a datetime: custom formats first, then the standard list, then
    /// RFC 3339 with an offset.
    #[must_use]
    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        for fmt in &self.datetime_formats {
            if let Some(parsed) = parse_datetime_with(t, fmt) {
                return Some(parsed);
            }
        }
        for fmt in STANDARD_DATETIME_FORMATS {
            if let Some(parsed) = parse_datetime_with(t, fmt) {
                return Some(parsed);
            }
        }
        chrono::DateTime::parse_from_rfc3339(t)
            .ok()
            .map(|dt| dt.naive_utc())
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("true_values", &self.true_values)
            .field("false_values", &self.false_values)
            .field("datetime_formats", &self.datetime_formats)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn parse_datetime_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, fmt)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Rewrite a culture-formatted number into the invariant form: group
/// separators removed, the decimal separator mapped to `.`.
fn normalize_number(text: &str, culture: &Culture) -> String {
    text.trim()
        .chars()
        .filter(|&c| c != culture.group_separator)
        .map(|c| {
            if c == culture.decimal_separator {
                '.'
            } else {
                c
            }
        })
        .collect()
}

/// Strip group separators only; integer targets reject fractional input.
fn normalize_integer(text: &str, culture: &Culture) -> String {
    text.trim()
        .chars()
        .filter(|&c| c != culture.group_separator)
        .collect()
}

/// Parse a 32-bit integer, honouring the culture's group separator.
#[must_use]
pub fn parse_int(text: &str, culture: &Culture) -> Option<i32> {
    normalize_integer(text, culture).parse().ok()
}

/// Parse a 64-bit integer (up to 19 significant digits), honouring the
/// culture's group separator.
#[must_use]
pub fn parse_bigint(text: &str, culture: &Culture) -> Option<i64> {
    normalize_integer(text, culture).parse().ok()
}

/// Parse a 64-bit float, scientific notation included.
#[must_use]
pub fn parse_float(text: &str, culture: &Culture) -> Option<f64> {
    let normalized = normalize_number(text, culture);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok()
}

/// Parse an exact decimal, scientific notation included.
#[must_use]
pub fn parse_decimal(text: &str, culture: &Culture) -> Option<Decimal> {
    let normalized = normalize_number(text, culture);
    if normalized.is_empty() {
        return None;
    }
    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()
    } else {
        normalized.parse().ok()
    }
}

/// Parse a currency amount: optional currency symbol, grouping,
/// parenthesised negatives and exponents.
#[must_use]
pub fn parse_money(text: &str, culture: &Culture) -> Option<Decimal> {
    let mut t = text.trim();
    let mut negative = false;
    if let Some(inner) = t
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        negative = true;
        t = inner.trim();
    }
    let cleaned = t.replace(culture.currency_symbol, "");
    let value = parse_decimal(cleaned.trim(), culture)?;
    Some(if negative { -value } else { value })
}

/// Parse a GUID in hyphenated, braced or bare 32-hex form.
#[must_use]
pub fn parse_guid(text: &str) -> Option<Uuid> {
    Uuid::parse_str(text.trim()).ok()
}

/// Parse a float vector from a bracketed or bare comma-separated list.
/// Elements are culture-neutral; an empty list fails.
#[must_use]
pub fn parse_vector(text: &str) -> Option<Vec<f32>> {
    let t = text.trim();
    let inner = match t.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']')?,
        None => t,
    };
    let inner = inner.trim();
    if inner.is_empty() {
        return None;
    }
    inner
        .split(',')
        .map(|element| element.trim().parse::<f32>().ok())
        .collect()
}

/// Count significant integer digits and fractional digits of a decimal,
/// measured on the exact decimal form of the absolute value. Leading zeros
/// are ignored unless the integer part is exactly `0`, which counts as one
/// digit.
#[must_use]
pub fn decimal_digits(value: &Decimal) -> (u32, u32) {
    let normalized = value.abs().normalize();
    let text = normalized.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let significant = int_part.trim_start_matches('0');
    let int_digits = if significant.is_empty() {
        1
    } else {
        significant.len() as u32
    };
    (int_digits, frac_part.len() as u32)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn bool_tokens() {
        let reg = ConverterRegistry::default();
        for token in ["true", "YES", "y", "On", "T", "1"] {
            assert_eq!(reg.parse_bool(token), Some(true), "{token}");
        }
        for token in ["false", "No", "n", "OFF", "f", "0"] {
            assert_eq!(reg.parse_bool(token), Some(false), "{token}");
        }
        assert_eq!(reg.parse_bool("2"), None);
        assert_eq!(reg.parse_bool("ja"), None);
    }

    #[test]
    fn custom_truth_values_replace_the_defaults() {
        let reg = ConverterRegistry::default().with_truth_values(&["ja"], &["nein"]);
        assert_eq!(reg.parse_bool("JA"), Some(true));
        assert_eq!(reg.parse_bool("nein"), Some(false));
        assert_eq!(reg.parse_bool("true"), None);
    }

    #[test]
    fn int_respects_grouping() {
        let inv = Culture::invariant();
        assert_eq!(parse_int("1,234", &inv), Some(1234));
        assert_eq!(parse_int("-42", &inv), Some(-42));
        assert_eq!(parse_int("1.5", &inv), None);
        assert_eq!(parse_int("2147483648", &inv), None);
    }

    #[test]
    fn bigint_accepts_nineteen_digits() {
        let inv = Culture::invariant();
        assert_eq!(
            parse_bigint("9223372036854775807", &inv),
            Some(i64::MAX)
        );
        assert_eq!(parse_bigint("9223372036854775808", &inv), None);
    }

    #[test]
    fn float_scientific_notation() {
        let inv = Culture::invariant();
        assert_eq!(parse_float("1.5e3", &inv), Some(1500.0));
        assert_eq!(parse_float("2,5", &Culture::de_de()), Some(2.5));
    }

    #[test]
    fn decimal_with_german_separators() {
        let d = parse_decimal("1.234,56", &Culture::de_de()).unwrap();
        assert_eq!(d, "1234.56".parse::<Decimal>().unwrap());
    }

    #[test]
    fn decimal_scientific_notation() {
        let d = parse_decimal("1.5E2", &Culture::invariant()).unwrap();
        assert_eq!(d, "150".parse::<Decimal>().unwrap());
    }

    #[test]
    fn money_currency_and_parens() {
        let us = Culture::en_us();
        assert_eq!(
            parse_money("$1,234.50", &us),
            Some("1234.50".parse().unwrap())
        );
        assert_eq!(
            parse_money("($99.95)", &us),
            Some("-99.95".parse().unwrap())
        );
        let de = Culture::de_de();
        assert_eq!(parse_money("1.234,50 €", &de), Some("1234.50".parse().unwrap()));
    }

    #[test]
    fn guid_forms() {
        let canonical = "550e8400-e29b-41d4-a716-446655440000";
        assert!(parse_guid(canonical).is_some());
        assert!(parse_guid("{550e8400-e29b-41d4-a716-446655440000}").is_some());
        assert!(parse_guid("550e8400e29b41d4a716446655440000").is_some());
        assert!(parse_guid("not-a-guid").is_none());
    }

    #[test]
    fn datetime_standard_formats() {
        let reg = ConverterRegistry::default();
        for input in [
            "2024-01-15",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00.123",
            "2024-01-15T10:30:00Z",
            "2024/01/15",
            "01/15/2024",
            "15-01-2024",
            "20240115",
            "20240115103000",
        ] {
            assert!(reg.parse_datetime(input).is_some(), "{input}");
        }
        assert!(reg.parse_datetime("not a date").is_none());
        assert!(reg.parse_datetime("2024-13-40").is_none());
    }

    #[test]
    fn us_form_wins_over_european() {
        let reg = ConverterRegistry::default();
        let parsed = reg.parse_datetime("03/04/2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn custom_formats_are_tried_first() {
        let reg = ConverterRegistry::default().with_datetime_formats(["%d.%m.%Y"]);
        let parsed = reg.parse_datetime("15.01.2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn vector_forms() {
        assert_eq!(parse_vector("[1.0, 2.5, -3]"), Some(vec![1.0, 2.5, -3.0]));
        assert_eq!(parse_vector("1,2,3"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse_vector("[]"), None);
        assert_eq!(parse_vector(""), None);
        assert_eq!(parse_vector("[1,x]"), None);
        assert_eq!(parse_vector("[1,2"), None);
    }

    #[test]
    fn registry_override_takes_precedence() {
        let reg = ConverterRegistry::default().with_override(
            TargetType::Int,
            Arc::new(|text, _| text.strip_prefix('#')?.parse().ok().map(SqlValue::Int)),
        );
        let inv = Culture::invariant();
        assert_eq!(
            reg.convert(TargetType::Int, "#7", &inv),
            Some(SqlValue::Int(7))
        );
        assert_eq!(reg.convert(TargetType::Int, "7", &inv), None);
        // The default registry is unaffected.
        assert_eq!(
            ConverterRegistry::default().convert(TargetType::Int, "7", &inv),
            Some(SqlValue::Int(7))
        );
    }

    #[test]
    fn digit_accounting() {
        let cases: &[(&str, u32, u32)] = &[
            ("19.99", 2, 2),
            ("29.50", 2, 1),
            ("0.5", 1, 1),
            ("0", 1, 0),
            ("-1234.567", 4, 3),
            ("007", 1, 0),
        ];
        for (input, int_digits, scale) in cases {
            let d: Decimal = input.parse().unwrap();
            assert_eq!(decimal_digits(&d), (*int_digits, *scale), "{input}");
        }
    }
}
