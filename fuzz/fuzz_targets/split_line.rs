#![no_main]

use csvload_parse::{split_line, QuoteMode, SplitOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz field splitting in both quote modes
    if let Ok(line) = std::str::from_utf8(data) {
        let strict = SplitOptions::default();
        let lenient = SplitOptions {
            mode: QuoteMode::Lenient,
            ..SplitOptions::default()
        };
        let _ = split_line(line, &strict);
        let _ = split_line(line, &lenient);
    }
});
