//! Property tests over the whole reader.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;

use proptest::prelude::*;

use csvload_reader::{CsvConfig, CsvReader, QuoteMode, SqlValue};

/// Minimal RFC 4180 writer over whole rows.
fn join_rows(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .map(|f| {
                if f.contains(',') || f.contains('"') || f.contains('\n') || f.contains('\r') {
                    format!("\"{}\"", f.replace('"', "\"\""))
                } else {
                    f.clone()
                }
            })
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn read_all(input: &str, config: CsvConfig) -> Vec<Vec<String>> {
    let mut reader =
        CsvReader::from_reader(Cursor::new(input.as_bytes().to_vec()), config).unwrap();
    let mut rows = Vec::new();
    while reader.read().unwrap() {
        rows.push(
            reader
                .record()
                .iter()
                .map(|v| match v {
                    SqlValue::String(s) => s.clone(),
                    SqlValue::Null => String::new(),
                    other => format!("{other:?}"),
                })
                .collect(),
        );
    }
    rows
}

proptest! {
    /// A written field grid re-parses to the same grid, delivered record
    /// count included. Fields avoid whitespace edges so no trimming or
    /// null rules interfere; the quoted/comma/newline content is the point.
    #[test]
    fn write_then_read_round_trips(
        rows in prop::collection::vec(
            prop::collection::vec("[a-z0-9,\"\n]{1,8}", 3), 1..12
        )
    ) {
        let width = 3usize;
        let header: Vec<String> = (0..width).map(|i| format!("h{i}")).collect();
        let mut all = vec![header];
        all.extend(rows.iter().cloned());
        let text = join_rows(&all);
        let parsed = read_all(&text, CsvConfig::default());
        prop_assert_eq!(parsed.len(), rows.len());
        for (got, want) in parsed.iter().zip(rows.iter()) {
            prop_assert_eq!(got, want);
        }
    }

    /// Lenient and strict modes deliver identical records on quote-free
    /// input.
    #[test]
    fn lenient_equals_strict_without_quotes(
        rows in prop::collection::vec(
            prop::collection::vec("[a-z0-9 .;-]{0,8}", 2), 1..10
        )
    ) {
        let mut text = String::from("a,b\n");
        for row in &rows {
            text.push_str(&row.join(","));
            text.push('\n');
        }
        let strict = read_all(&text, CsvConfig::default().skip_empty_lines(false)
            .mismatched_field_action(csvload_reader::MismatchAction::PadOrTruncate));
        let lenient = read_all(&text, CsvConfig::default().skip_empty_lines(false)
            .quote_mode(QuoteMode::Lenient)
            .mismatched_field_action(csvload_reader::MismatchAction::PadOrTruncate));
        prop_assert_eq!(strict, lenient);
    }
}
