//! End-to-end schema inference scenarios.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{Cursor, Write};

use csvload_reader::{CancelToken, CsvConfig, Error, TargetType};
use csvload_schema::{create_table_sql, infer_full, infer_sample, to_column_types, SchemaInference};

fn cursor(input: &str) -> Cursor<Vec<u8>> {
    Cursor::new(input.as_bytes().to_vec())
}

const MIXED: &str = "\
Id,Name,Price,Active,Created,Uuid
1,Widget,19.99,true,2024-01-15,550e8400-e29b-41d4-a716-446655440000
2,Widget2,29.50,false,2024-02-20,6ba7b810-9dad-11d1-80b4-00c04fd430c8
3,Gadget,5.00,true,2024-03-01,6ba7b811-9dad-11d1-80b4-00c04fd430c8
4,Gizmo,120.75,false,2024-04-10,6ba7b812-9dad-11d1-80b4-00c04fd430c8
";

#[test]
fn mixed_types_scenario() {
    let columns = infer_full(cursor(MIXED), CsvConfig::default(), None, None).unwrap();
    let types: Vec<&str> = columns.iter().map(|c| c.sql_type.as_str()).collect();
    assert_eq!(
        types,
        [
            "int",
            "varchar(7)",
            "decimal(5,2)",
            "bit",
            "datetime2",
            "uniqueidentifier"
        ]
    );
    assert!(columns.iter().all(|c| !c.is_nullable));
    assert!(columns.iter().all(|c| c.total_count == 4));
}

#[test]
fn sample_mode_stops_after_n_rows() {
    // Row 3 would widen Name beyond varchar(7); a 2-row sample never sees it.
    let input = "Id,Name\n1,Widget\n2,Widget2\n3,ExtremelyLongProductName\n";
    let columns = infer_sample(cursor(input), CsvConfig::default(), 2).unwrap();
    assert_eq!(columns[1].sql_type, "varchar(7)");
    assert_eq!(columns[1].total_count, 2);
}

#[test]
fn nullable_columns_are_reported() {
    let input = "A,B\n1,\n2,x\n";
    let columns = infer_full(cursor(input), CsvConfig::default(), None, None).unwrap();
    assert!(!columns[0].is_nullable);
    assert!(columns[1].is_nullable);
    assert_eq!(columns[1].non_null_count, 1);
}

#[test]
fn all_null_column_is_varchar_1() {
    let input = "A,B\n1,\n2,\n";
    let columns = infer_full(cursor(input), CsvConfig::default(), None, None).unwrap();
    assert_eq!(columns[1].sql_type, "varchar(1)");
    assert!(columns[1].is_nullable);
}

#[test]
fn unicode_text_is_nvarchar() {
    let input = "City\nMünchen\nMalmö\n";
    let columns = infer_full(cursor(input), CsvConfig::default(), None, None).unwrap();
    assert_eq!(columns[0].sql_type, "nvarchar(7)");
    assert!(columns[0].is_unicode);
}

#[test]
fn custom_datetime_formats_shape_the_lattice() {
    let input = "When\n15.01.2024\n20.02.2024\n";
    let config = CsvConfig::default().datetime_formats(["%d.%m.%Y"]);
    let columns = infer_full(cursor(input), config, None, None).unwrap();
    assert_eq!(columns[0].sql_type, "datetime2");
}

#[test]
fn inferred_types_feed_back_into_the_reader() {
    let columns = infer_full(cursor(MIXED), CsvConfig::default(), None, None).unwrap();
    let mut config = CsvConfig::default();
    config.column_types = to_column_types(&columns);
    let mut reader = csvload_reader::CsvReader::from_reader(cursor(MIXED), config).unwrap();
    assert!(reader.read().unwrap());
    assert_eq!(reader.get_i32(0).unwrap(), 1);
    assert_eq!(reader.get_decimal(2).unwrap(), "19.99".parse().unwrap());
    assert!(reader.get_bool(3).unwrap());
    assert_eq!(
        reader.get_uuid(5).unwrap().to_string(),
        "550e8400-e29b-41d4-a716-446655440000"
    );
}

#[test]
fn create_table_statement_for_the_scenario() {
    let columns = infer_full(cursor(MIXED), CsvConfig::default(), None, None).unwrap();
    let sql = create_table_sql(&columns, "products", "dbo");
    assert!(sql.starts_with("CREATE TABLE [dbo].[products] (\n"));
    assert!(sql.contains("    [Id] int NOT NULL,\n"));
    assert!(sql.contains("    [Price] decimal(5,2) NOT NULL,\n"));
    assert!(sql.contains("    [Uuid] uniqueidentifier NOT NULL\n"));
    assert!(sql.ends_with(");"));
}

#[test]
fn progress_is_monotonic_and_reaches_100() {
    let mut body = String::from("A,B\n");
    for i in 0..2000 {
        body.push_str(&format!("{i},value{i}\n"));
    }
    let total = body.len() as u64;
    let mut seen: Vec<u8> = Vec::new();
    {
        let mut callback = |pct: u8| seen.push(pct);
        SchemaInference::new(CsvConfig::default())
            .run_reader(cursor(&body), Some(total), Some(&mut callback))
            .unwrap();
    }
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "not monotonic: {seen:?}");
    assert_eq!(*seen.last().unwrap(), 100);
}

#[test]
fn pre_cancelled_token_fails_before_any_row() {
    let token = CancelToken::new();
    token.cancel();
    let err = infer_full(cursor(MIXED), CsvConfig::default(), None, Some(token)).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn gzip_input_is_inferred_transparently() {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(MIXED.as_bytes()).unwrap();
    let compressed = enc.finish().unwrap();
    let columns =
        infer_full(Cursor::new(compressed), CsvConfig::default(), None, None).unwrap();
    assert_eq!(columns[0].sql_type, "int");
    assert_eq!(columns[5].sql_type, "uniqueidentifier");
}

mod properties {
    use super::*;
    use csvload_schema::ColumnTypeAnalyzer;
    use csvload_types::{ConverterRegistry, Culture};
    use proptest::prelude::*;

    proptest! {
        /// The possible-set narrows monotonically over any value sequence.
        #[test]
        fn possible_set_never_widens(values in prop::collection::vec(".{0,16}", 0..32)) {
            let mut analyzer = ColumnTypeAnalyzer::new(
                "c",
                0,
                ConverterRegistry::default(),
                Culture::invariant(),
            );
            let mut last = analyzer.possible();
            for value in &values {
                analyzer.add(value);
                let now = analyzer.possible();
                prop_assert_eq!(now & last, now);
                last = now;
            }
            // Finalization always lands on some type.
            prop_assert!(!analyzer.finalize().sql_type.is_empty());
        }
    }
}

#[test]
fn declared_column_types_do_not_skew_the_scan() {
    // Inference reads raw text even when the caller's config types columns.
    let config = CsvConfig::default().column_type("Id", TargetType::Guid);
    let columns = infer_full(cursor(MIXED), config, None, None).unwrap();
    assert_eq!(columns[0].sql_type, "int");
}
