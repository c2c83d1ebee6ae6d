#![no_main]

//! Fuzz target for identifier extraction
//!
//! Arbitrary scanned text must never panic, and an extracted identifier must
//! extract to itself again.
//!
//! Run with: cargo +nightly fuzz run fuzz_extract

use libfuzzer_sys::fuzz_target;
use pharmacheck_core::extract_identifier;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(id) = extract_identifier(text) {
        let canonical = id.to_string();
        assert_eq!(extract_identifier(&canonical), Ok(id));
    }
});
