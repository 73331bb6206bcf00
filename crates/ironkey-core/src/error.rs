//! Error types for registry operations.
//!
//! Errors carry the offending path, fingerprint form, or query string for
//! diagnosis — never secret material.

use ironkey_crypto::DeriveError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Errors from key-registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The seed store is locked or not yet unlocked
    #[error("seed unavailable: backing store is locked")]
    SeedUnavailable,

    /// No registered key matches the query
    #[error("no registered key matches `{query}`")]
    KeyNotFound {
        /// The path, fingerprint, or short form that failed to resolve
        query: String,
    },

    /// The path already has a bookkeeping row
    #[error("path `{path}` is already registered")]
    AlreadyRegistered {
        /// The duplicate path
        path: String,
    },

    /// Two registered keys share a short-fingerprint prefix.
    ///
    /// An operational alert, not a security failure: the 80-bit short-form
    /// space makes this astronomically unlikely, and full digests still
    /// disambiguate the keys.
    #[error("short fingerprint `{short}` matches multiple registered keys")]
    FingerprintCollision {
        /// The ambiguous short form
        short: String,
    },

    /// The key exists but must not be offered for new encryption
    #[error("key at `{path}` is {state:?}, not an encryption target")]
    NotEncryptable {
        /// Path of the refused key
        path: String,
        /// Its current lifecycle state
        state: LifecycleState,
    },

    /// Illegal lifecycle transition
    #[error("cannot move key at `{path}` from {from:?} to {to:?}")]
    InvalidTransition {
        /// Path of the key
        path: String,
        /// Current state
        from: LifecycleState,
        /// Requested state
        to: LifecycleState,
    },

    /// A role line has exhausted its 32-bit rotation index
    #[error("rotation index exhausted at `{path}`")]
    IndexExhausted {
        /// The path holding the final index
        path: String,
    },

    /// Derivation-layer failure
    #[error(transparent)]
    Derive(#[from] DeriveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_query() {
        let err = RegistryError::KeyNotFound { query: "x1-abc".to_string() };
        assert_eq!(err.to_string(), "no registered key matches `x1-abc`");
    }

    #[test]
    fn derive_errors_pass_through() {
        let err = RegistryError::from(DeriveError::InvalidSeed { len: 3, expected: "32 or 64" });
        assert_eq!(err.to_string(), "invalid seed: 3 bytes (expected 32 or 64)");
    }
}
