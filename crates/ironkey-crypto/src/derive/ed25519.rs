//! Hardened hierarchical derivation for the signing branch.
//!
//! SLIP-0010-style Ed25519 chain: the master node splits
//! `HMAC-SHA512("ed25519 seed", seed)` into a key and a chain code, then
//! every path segment derives a hardened child from
//! `HMAC-SHA512(chain, 0x00 ‖ key ‖ ser32(segment | 2^31))`. There is no
//! non-hardened branch: a leaked child key plus the parent's public chain
//! material can never reconstruct the parent.
//!
//! Chain segments, in order: account, role id (fixed v1 table), index.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::{
    derive::{KeyPair, PublicKey, SecretKey},
    error::DeriveError,
    path::{Curve, DerivationPath},
};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for the master node (the published Ed25519 curve constant).
const MASTER_KEY: &[u8] = b"ed25519 seed";

/// Hardened-derivation marker: the high bit of a 32-bit segment index.
const HARDENED_BIT: u32 = 0x8000_0000;

/// Derive the Ed25519 keypair named by `path`.
///
/// The final chain key is the 32-byte Ed25519 secret in seed form; the
/// public key follows the curve's standard key-generation rule (SHA-512,
/// clamp, base-point multiply).
///
/// # Errors
///
/// - `InvalidSeed` unless the seed is 32 or 64 bytes
/// - `InvalidPath` if `path` names the X25519 curve
///
/// Total after validation: the chain itself cannot fail.
pub fn derive_ed25519(seed: &[u8], path: &DerivationPath) -> Result<KeyPair, DeriveError> {
    if path.curve != Curve::Ed25519 {
        return Err(DeriveError::invalid_path(
            &path.to_string(),
            "ed25519 derivation requires an ed25519 path",
        ));
    }
    if seed.len() != 32 && seed.len() != 64 {
        return Err(DeriveError::InvalidSeed { len: seed.len(), expected: "32 or 64" });
    }

    let (mut key, mut chain) = master_node(seed);
    for segment in [path.account, path.role.chain_id(), path.index] {
        let (next_key, next_chain) = hardened_child(&key, &chain, segment);
        key.zeroize();
        chain.zeroize();
        key = next_key;
        chain = next_chain;
    }
    chain.zeroize();

    let signing = ed25519_dalek::SigningKey::from_bytes(&key);
    let public = PublicKey::from_bytes(signing.verifying_key().to_bytes());
    let secret = SecretKey::from_bytes(key);
    key.zeroize();

    Ok(KeyPair { secret, public })
}

/// Split `HMAC-SHA512(MASTER_KEY, seed)` into `(key, chain code)`.
fn master_node(seed: &[u8]) -> ([u8; 32], [u8; 32]) {
    let Ok(mut mac) = HmacSha512::new_from_slice(MASTER_KEY) else {
        unreachable!("HMAC-SHA512 accepts any key size");
    };
    mac.update(seed);
    split(&mac.finalize().into_bytes())
}

/// One hardened chain step: `HMAC-SHA512(chain, 0x00 ‖ key ‖ ser32(i'))`.
///
/// `i' = segment | 2^31` — segments at or above `2^31` already carry the
/// hardened bit, so OR never wraps.
fn hardened_child(key: &[u8; 32], chain: &[u8; 32], segment: u32) -> ([u8; 32], [u8; 32]) {
    let Ok(mut mac) = HmacSha512::new_from_slice(chain) else {
        unreachable!("HMAC-SHA512 accepts any key size");
    };
    mac.update(&[0x00]);
    mac.update(key);
    mac.update(&(segment | HARDENED_BIT).to_be_bytes());
    split(&mac.finalize().into_bytes())
}

fn split(digest: &[u8]) -> ([u8; 32], [u8; 32]) {
    let mut key = [0u8; 32];
    let mut chain = [0u8; 32];
    key.copy_from_slice(&digest[..32]);
    chain.copy_from_slice(&digest[32..]);
    (key, chain)
}
