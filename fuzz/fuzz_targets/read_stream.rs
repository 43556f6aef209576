#![no_main]

use csvload_reader::{CsvConfig, CsvReader, MismatchAction, ParseErrorAction, QuoteMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whole-reader robustness: arbitrary bytes, permissive policies
    let config = CsvConfig::default()
        .has_header(false)
        .quote_mode(QuoteMode::Lenient)
        .mismatched_field_action(MismatchAction::PadOrTruncate)
        .parse_error_action(ParseErrorAction::SkipRow)
        .max_quoted_field_length(1 << 16)
        .max_decompressed_size(1 << 20);
    if let Ok(mut reader) = CsvReader::from_reader(std::io::Cursor::new(data.to_vec()), config) {
        while let Ok(true) = reader.read() {}
    }
});
