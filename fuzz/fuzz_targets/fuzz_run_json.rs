//! Fuzz target for the JSON entrypoint.
//!
//! Validates:
//! - No panics on arbitrary mode/argument pairs
//! - Output is always JSON: a receipt with a `mode`, or an error envelope
//! - Identical input gives identical output

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use tally_core::ffi::run_json_with_source;
use tally_scan::MemorySource;
use tally_types::FileRecord;

const MAX_INPUT_SIZE: usize = 16 * 1024;

fn source() -> MemorySource {
    MemorySource::new(vec![
        FileRecord::new("src/lib.rs", "Rust", 40, 6, 4).with_size(1600, 400),
        FileRecord::new("src/io/read.rs", "Rust", 22, 2, 3).with_size(900, 225),
        FileRecord::new("docs/index.md", "Markdown", 0, 0, 5).with_size(300, 75),
        FileRecord::new("docs/index.md", "Rust", 4, 0, 0).child(),
        FileRecord::new("setup.py", "Python", 12, 1, 1).with_size(420, 105),
    ])
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > MAX_INPUT_SIZE {
        return;
    }
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // First line picks the mode, the rest is the argument payload.
    let (mode, args) = input.split_once('\n').unwrap_or((input, "{}"));

    let src = source();
    let out = run_json_with_source(&src, mode, args);
    let parsed: Value = serde_json::from_str(&out).expect("output must be valid JSON");

    if parsed.get("error").is_some() {
        assert_eq!(parsed["error"], true);
        assert!(parsed["code"].is_string());
        assert!(parsed["message"].is_string());
    } else {
        assert_eq!(parsed["mode"], mode);
        assert!(parsed["schema_version"].is_u64());
    }

    assert_eq!(out, run_json_with_source(&src, mode, args));
});
