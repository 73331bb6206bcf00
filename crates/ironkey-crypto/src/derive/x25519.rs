//! Flat HKDF derivation for the key-agreement branch.
//!
//! Deliberately non-hierarchical: no chain code propagates. Every path
//! derives independently from the master seed through one auditable
//! HKDF-SHA512 call (RFC 5869), with the *entire* canonical path string as
//! the expand `info` — every distinct path is a distinct expansion context.
//! Delegation is not needed when all paths share one seed, and giving it up
//! buys a single-step derivation.

use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroize;

use crate::{
    derive::{KeyPair, PublicKey, SecretKey},
    error::DeriveError,
    path::{Curve, DerivationPath},
};

/// Label hashed into the fixed per-curve extract salt.
const SALT_LABEL: &[u8] = b"ik:x25519:root";

/// Derive the X25519 keypair named by `path`.
///
/// `okm = HKDF-Expand(HKDF-Extract(SHA-256(SALT_LABEL), seed), path, 32)`,
/// clamped as an X25519 scalar. The clamped scalar is the secret; the
/// public key is the base-point multiply.
///
/// # Errors
///
/// - `InvalidSeed` if the seed is empty
/// - `InvalidPath` if `path` names the Ed25519 curve
pub fn derive_x25519(seed: &[u8], path: &DerivationPath) -> Result<KeyPair, DeriveError> {
    if path.curve != Curve::X25519 {
        return Err(DeriveError::invalid_path(
            &path.to_string(),
            "x25519 derivation requires an x25519 path",
        ));
    }
    if seed.is_empty() {
        return Err(DeriveError::InvalidSeed { len: 0, expected: "at least 1 byte" });
    }

    let salt: [u8; 32] = Sha256::digest(SALT_LABEL).into();
    let hkdf = Hkdf::<Sha512>::new(Some(salt.as_slice()), seed);

    let info = path.to_string();
    let mut okm = [0u8; 32];
    let Ok(()) = hkdf.expand(info.as_bytes(), &mut okm) else {
        unreachable!("32 bytes is a valid HKDF-SHA512 output length");
    };
    clamp(&mut okm);

    let public = x25519_dalek::PublicKey::from(&x25519_dalek::StaticSecret::from(okm));
    let secret = SecretKey::from_bytes(okm);
    okm.zeroize();

    Ok(KeyPair { secret, public: PublicKey::from_bytes(public.to_bytes()) })
}

/// Clamp a raw scalar for X25519: clear the low 3 bits of byte 0, clear bit
/// 7 and set bit 6 of byte 31 (RFC 7748).
fn clamp(scalar: &mut [u8; 32]) {
    scalar[0] &= 0b1111_1000;
    scalar[31] &= 0b0111_1111;
    scalar[31] |= 0b0100_0000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Role;

    fn path(account: u32, role: Role, index: u32) -> DerivationPath {
        DerivationPath::new(Curve::X25519, account, role, index)
    }

    #[test]
    fn derivation_is_deterministic() {
        let seed = [4u8; 32];
        let p = path(0, Role::Encryption, 0);

        let a = derive_x25519(&seed, &p).unwrap();
        let b = derive_x25519(&seed, &p).unwrap();

        assert_eq!(a.secret.as_bytes(), b.secret.as_bytes());
        assert_eq!(a.public, b.public);
    }

    #[test]
    fn rejects_empty_seed() {
        let result = derive_x25519(&[], &path(0, Role::Encryption, 0));
        assert!(matches!(result, Err(DeriveError::InvalidSeed { len: 0, .. })));
    }

    #[test]
    fn rejects_ed25519_path() {
        let p = DerivationPath::new(Curve::Ed25519, 0, Role::Identity, 0);
        assert!(matches!(derive_x25519(&[0u8; 32], &p), Err(DeriveError::InvalidPath { .. })));
    }

    #[test]
    fn secret_is_clamped() {
        let pair = derive_x25519(&[6u8; 32], &path(3, Role::Encryption, 9)).unwrap();
        let secret = pair.secret.as_bytes();

        assert_eq!(secret[0] & 0b0000_0111, 0);
        assert_eq!(secret[31] & 0b1000_0000, 0);
        assert_eq!(secret[31] & 0b0100_0000, 0b0100_0000);
    }

    #[test]
    fn every_path_component_changes_the_key() {
        let seed = [8u8; 32];
        let base = derive_x25519(&seed, &path(0, Role::Encryption, 0)).unwrap();

        for other in [
            path(1, Role::Encryption, 0),
            path(0, Role::Recovery, 0),
            path(0, Role::Encryption, 1),
        ] {
            let derived = derive_x25519(&seed, &other).unwrap();
            assert_ne!(derived.public, base.public, "{other}");
        }
    }

    #[test]
    fn shared_secret_agrees_across_derived_pairs() {
        // ECDH sanity: two derived parties agree on the shared secret.
        let alice = derive_x25519(&[1u8; 32], &path(0, Role::Encryption, 0)).unwrap();
        let bob = derive_x25519(&[2u8; 32], &path(0, Role::Encryption, 0)).unwrap();

        let ab = x25519_dalek::StaticSecret::from(*alice.secret.as_bytes())
            .diffie_hellman(&x25519_dalek::PublicKey::from(*bob.public.as_bytes()));
        let ba = x25519_dalek::StaticSecret::from(*bob.secret.as_bytes())
            .diffie_hellman(&x25519_dalek::PublicKey::from(*alice.public.as_bytes()));

        assert_eq!(ab.as_bytes(), ba.as_bytes());
    }
}
