#![no_main]

use csvload_parse::{open_stream, sniff, Compression};
use libfuzzer_sys::fuzz_target;
use std::io::Read;

fuzz_target!(|data: &[u8]| {
    // The probe must never panic on arbitrary prefixes, and a detected
    // container must fail cleanly on garbage payloads.
    let _ = sniff(data);
    let source = Box::new(std::io::Cursor::new(data.to_vec()));
    if let Ok(mut stream) = open_stream(source, Compression::Auto, 1 << 16) {
        let mut sink = [0u8; 512];
        while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
    }
});
