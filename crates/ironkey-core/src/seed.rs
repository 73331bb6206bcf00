//! Root-seed handling.
//!
//! The registry never stores seed bytes; it asks a [`SeedSource`] every
//! time it needs to re-derive a key. Mnemonic handling, keystore files,
//! and unlock prompts all live behind that trait in collaborator crates.

use std::fmt;

use ironkey_crypto::DeriveError;
use zeroize::Zeroize;

use crate::error::RegistryError;

/// Root secret bytes, exactly 32 or 64 of them.
///
/// Zeroized on drop; `Debug` is redacted so seed material never reaches
/// logs.
#[derive(Clone)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Wrap seed bytes, enforcing the supported lengths.
    ///
    /// # Errors
    ///
    /// `InvalidSeed` unless `bytes` is 32 or 64 bytes long.
    pub fn new(bytes: Vec<u8>) -> Result<Self, DeriveError> {
        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(DeriveError::InvalidSeed { len: bytes.len(), expected: "32 or 64" });
        }
        Ok(Self { bytes })
    }

    /// Raw seed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({} bytes)", self.bytes.len())
    }
}

/// Supplier of the root seed.
///
/// Implementations own unlocking, caching, and storage policy. A source
/// that is currently locked returns [`RegistryError::SeedUnavailable`];
/// the registry propagates that without retrying (unlocking is the
/// caller's business).
pub trait SeedSource {
    /// Return the root seed.
    fn seed(&self) -> Result<Seed, RegistryError>;
}

/// In-memory seed source with an explicit lock switch.
///
/// Suitable for tests and for callers that manage seed lifetime
/// themselves; anything touching disk or hardware belongs in a
/// collaborator crate.
#[derive(Debug)]
pub struct MemorySeedSource {
    seed: Seed,
    locked: bool,
}

impl MemorySeedSource {
    /// Create an unlocked source holding `seed`.
    pub fn new(seed: Seed) -> Self {
        Self { seed, locked: false }
    }

    /// Refuse further `seed()` calls until unlocked.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Allow `seed()` calls again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }
}

impl SeedSource for MemorySeedSource {
    fn seed(&self) -> Result<Seed, RegistryError> {
        if self.locked {
            return Err(RegistryError::SeedUnavailable);
        }
        Ok(self.seed.clone())
    }
}
