//! Fuzz target for `Envelope::decode`
//!
//! This fuzzer tests envelope wire decoding with arbitrary bytes to find:
//! - Parser crashes or panics
//! - Integer overflows in length arithmetic
//! - Huge claimed lengths that allocate before bounds checks
//! - Inputs that decode but do not re-encode to the same bytes
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use ironkey_crypto::Envelope;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic, and anything it accepts must re-encode
    // to exactly the input bytes (the layout has one canonical form).
    if let Ok(envelope) = Envelope::decode(data) {
        let mut wire = Vec::new();
        envelope.encode(&mut wire).expect("decoded envelope must re-encode");
        assert_eq!(wire, data, "decode/encode round trip diverged");
    }
});
