//! Fuzz target for `DerivationPath::parse`
//!
//! This fuzzer tests path parsing with arbitrary strings to find:
//! - Parser crashes or panics
//! - Inputs that parse but do not round-trip through `Display`
//! - Non-canonical strings that slip past validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use ironkey_crypto::DerivationPath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic, and anything it accepts must be the
    // canonical rendering of the parsed value.
    if let Ok(path) = DerivationPath::parse(input) {
        let rendered = path.to_string();
        assert_eq!(rendered, input, "accepted a non-canonical path string");
        assert_eq!(DerivationPath::parse(&rendered), Ok(path));
    }
});
