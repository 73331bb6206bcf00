//! Error types for envelope sealing and opening.

use thiserror::Error;

/// Errors from envelope operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Sealing requires at least one recipient
    #[error("envelope needs at least one recipient")]
    NoRecipients,

    /// ECDH with a recipient produced a non-contributory shared secret
    /// (small-order public key)
    #[error("degenerate shared secret for recipient {recipient_index}")]
    DegenerateSharedSecret {
        /// Position of the offending recipient in the seal input
        recipient_index: usize,
    },

    /// Content-key unwrap failed for every entry that resolved.
    ///
    /// Per-entry unwrap failures are recoverable — opening continues with
    /// the remaining entries — so this surfaces only after all of them have
    /// been attempted.
    #[error("failed to unwrap content key for recipient entry {recipient_index}")]
    UnwrapFailed {
        /// Index of the last entry whose unwrap failed
        recipient_index: usize,
    },

    /// Body MAC mismatch. Fatal: no plaintext is released.
    #[error("body authentication failed")]
    BodyAuthenticationFailed,

    /// No recipient entry resolved to a key the caller holds
    #[error("no recipient entry matches an available key")]
    NoMatchingRecipient,

    /// Unknown algorithm id on the wire
    #[error("unsupported envelope algorithm {alg:#04x}")]
    UnsupportedAlgorithm {
        /// The rejected algorithm byte
        alg: u8,
    },

    /// Structurally invalid wire bytes
    #[error("malformed envelope: {reason}")]
    Malformed {
        /// What made the bytes invalid
        reason: String,
    },
}

impl EnvelopeError {
    /// True if this failure aborts the whole operation.
    ///
    /// Only a per-entry unwrap failure is recoverable: one bad recipient
    /// entry never prevents attempts against the others. A body MAC
    /// mismatch or structural failure always aborts.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnwrapFailed { .. })
    }
}
