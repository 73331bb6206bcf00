//! Deterministic keypair derivation from a root seed.
//!
//! Two purpose-built constructions share one seed with strict domain
//! separation:
//!
//! - [`ed25519`]: hardened hierarchical HMAC-SHA512 chain for the signing
//!   branch (no public derivation anywhere).
//! - [`x25519`]: flat single-step HKDF-SHA512 for the key-agreement branch.
//!
//! Derivation is a pure function of `(seed, path)`: identical inputs always
//! yield identical keypairs, distinct paths yield cryptographically
//! independent keys, and no function maps a key on one branch to a key on
//! the other.

mod ed25519;
mod x25519;

use std::fmt;

use zeroize::Zeroize;

pub use ed25519::derive_ed25519;
pub use x25519::derive_x25519;

use crate::{error::DeriveError, path::{Curve, DerivationPath}};

/// A 32-byte private scalar in its curve's key-generation form.
///
/// Zeroized on drop. `Debug` is redacted so key bytes never reach logs.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A 32-byte public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap raw public-key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw public-key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// A derived keypair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Private scalar (curve-clamped form for X25519, seed form for Ed25519)
    pub secret: SecretKey,
    /// Matching public key
    pub public: PublicKey,
}

/// Derive the keypair named by `path`, dispatching on its curve.
///
/// # Errors
///
/// - `InvalidSeed` if the seed length is unsupported for the path's curve
/// - `InvalidPath` never from this entry point (the curve always matches)
pub fn derive(seed: &[u8], path: &DerivationPath) -> Result<KeyPair, DeriveError> {
    match path.curve {
        Curve::Ed25519 => derive_ed25519(seed, path),
        Curve::X25519 => derive_x25519(seed, path),
    }
}
