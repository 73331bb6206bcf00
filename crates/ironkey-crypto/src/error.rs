//! Error types for path handling and key derivation.
//!
//! Derivation errors are deterministic and local: they are raised before any
//! chain step runs and are never worth retrying. Errors carry the offending
//! path or seed length, never seed or key bytes.

use thiserror::Error;

/// Errors from path parsing and keypair derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// Seed material has an unsupported length
    #[error("invalid seed: {len} bytes (expected {expected})")]
    InvalidSeed {
        /// Length of the rejected seed
        len: usize,
        /// Human-readable description of the accepted lengths
        expected: &'static str,
    },

    /// Path string is not canonical, or a path was handed to the wrong deriver
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path string
        path: String,
        /// What made it invalid
        reason: String,
    },
}

impl DeriveError {
    /// Construct an `InvalidPath` for `path` with the given reason.
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.to_string(), reason: reason.into() }
    }
}
