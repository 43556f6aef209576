//! Conversion edge case tests.
//!
//! Tests edge cases for:
//! - Culture-sensitive number parsing
//! - Datetime format precedence
//! - Registry cloning and customization
//! - Decimal identity across cultures

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use csvload_types::convert::{parse_decimal, parse_int, parse_money};
use csvload_types::{ConverterRegistry, Culture, SqlValue, TargetType};

// ============================================================================
// Culture Matrix
// ============================================================================

mod cultures {
    use super::*;

    #[test]
    fn same_quantity_parses_under_each_culture() {
        let expected: Decimal = "1234.56".parse().unwrap();
        let cases = [
            ("1,234.56", Culture::en_us()),
            ("1.234,56", Culture::de_de()),
            ("1\u{00A0}234,56", Culture::fr_fr()),
            ("1\u{00A0}234,56", Culture::sv_se()),
            ("1234.56", Culture::invariant()),
        ];
        for (text, culture) in cases {
            assert_eq!(
                parse_decimal(text, &culture),
                Some(expected),
                "{} under {}",
                text,
                culture.name
            );
        }
    }

    #[test]
    fn integer_grouping_per_culture() {
        assert_eq!(parse_int("1.000.000", &Culture::de_de()), Some(1_000_000));
        assert_eq!(parse_int("1,000,000", &Culture::en_us()), Some(1_000_000));
    }

    #[test]
    fn money_symbols_per_culture() {
        assert_eq!(
            parse_money("kr 99,50", &Culture::sv_se()),
            Some("99.50".parse().unwrap())
        );
        assert_eq!(
            parse_money("¤12.00", &Culture::invariant()),
            Some("12.00".parse().unwrap())
        );
    }
}

// ============================================================================
// Registry Semantics
// ============================================================================

mod registry {
    use super::*;

    #[test]
    fn clone_customization_leaves_the_original_alone() {
        let base = ConverterRegistry::default();
        let custom = base.clone().with_truth_values(&["oui"], &["non"]);
        assert_eq!(custom.parse_bool("oui"), Some(true));
        assert_eq!(base.parse_bool("oui"), None);
        assert_eq!(base.parse_bool("yes"), Some(true));
    }

    #[test]
    fn override_applies_only_to_its_target() {
        let reg = ConverterRegistry::default().with_override(
            TargetType::Text,
            Arc::new(|text, _| Some(SqlValue::String(text.to_uppercase()))),
        );
        let inv = Culture::invariant();
        assert_eq!(
            reg.convert(TargetType::Text, "abc", &inv),
            Some(SqlValue::String("ABC".into()))
        );
        assert_eq!(
            reg.convert(TargetType::Int, "5", &inv),
            Some(SqlValue::Int(5))
        );
    }

    #[test]
    fn conversion_failure_is_none_not_a_panic() {
        let reg = ConverterRegistry::default();
        let inv = Culture::invariant();
        for target in [
            TargetType::Bit,
            TargetType::Int,
            TargetType::BigInt,
            TargetType::Float,
            TargetType::Decimal,
            TargetType::Money,
            TargetType::DateTime,
            TargetType::Guid,
            TargetType::Vector,
        ] {
            assert_eq!(reg.convert(target, "certainly not it", &inv), None);
        }
    }

    #[test]
    fn text_target_accepts_anything() {
        let reg = ConverterRegistry::default();
        let inv = Culture::invariant();
        assert_eq!(
            reg.convert(TargetType::Text, "certainly not it", &inv),
            Some(SqlValue::String("certainly not it".into()))
        );
    }
}

// ============================================================================
// Datetime Precedence
// ============================================================================

mod datetime {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn custom_format_beats_the_standard_list() {
        // Without the custom format this parses month-first.
        let ambiguous = "03/04/2024";
        let default_reg = ConverterRegistry::default();
        assert_eq!(
            default_reg.parse_datetime(ambiguous).unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        let day_first = ConverterRegistry::default().with_datetime_formats(["%d/%m/%Y"]);
        assert_eq!(
            day_first.parse_datetime(ambiguous).unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()
        );
    }

    #[test]
    fn offset_forms_normalize_to_utc() {
        let reg = ConverterRegistry::default();
        let parsed = reg.parse_datetime("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Decimal parse -> format -> parse is an identity under every preset
    /// culture.
    #[test]
    fn decimal_round_trips_per_culture(
        int_part in 0i64..1_000_000,
        frac in 0u32..10_000,
        negative in any::<bool>(),
        culture_ix in 0usize..5,
    ) {
        let cultures = [
            Culture::invariant(),
            Culture::en_us(),
            Culture::de_de(),
            Culture::fr_fr(),
            Culture::sv_se(),
        ];
        let culture = &cultures[culture_ix];
        let mut value: Decimal = format!("{int_part}.{frac:04}").parse().unwrap();
        if negative {
            value = -value;
        }
        let formatted = culture.format_decimal(&value);
        let reparsed = parse_decimal(&formatted, culture);
        prop_assert_eq!(reparsed, Some(value));
    }

    /// Integer conversion agrees with native parsing on plain input.
    #[test]
    fn plain_integers_parse_everywhere(value in any::<i32>()) {
        let text = value.to_string();
        for culture in [Culture::invariant(), Culture::de_de(), Culture::fr_fr()] {
            prop_assert_eq!(parse_int(&text, &culture), Some(value));
        }
    }
}
