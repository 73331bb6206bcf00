//! Fuzz target for `ShortFingerprint` parsing
//!
//! Short-fingerprint strings arrive from the wire inside envelope
//! recipient entries, so the parser sees attacker-controlled input:
//! - Parser crashes or panics
//! - Base58 decodes with unexpected lengths
//! - Inputs that parse but do not round-trip through `Display`
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use ironkey_crypto::ShortFingerprint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(short) = input.parse::<ShortFingerprint>() {
        let rendered = short.to_string();
        assert_eq!(rendered.parse::<ShortFingerprint>(), Ok(short));
    }
});
