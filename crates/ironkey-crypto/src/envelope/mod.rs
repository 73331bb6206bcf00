//! Hybrid multi-recipient envelopes.
//!
//! One plaintext body is sealed exactly once under a fresh random
//! content-encryption key (CEK); the CEK is then wrapped separately for
//! each recipient with an ephemeral X25519 ECDH and a second AEAD pass.
//! Cost is O(body) once plus O(32 bytes) per recipient, against
//! O(body × recipients) for the naive re-encrypt-per-recipient scheme.
//!
//! AEAD is XChaCha20-Poly1305 throughout: 24-byte nonces, 16-byte tags.
//!
//! # Security
//!
//! - The CEK lives for one [`seal`] call, is zeroized on return, and is
//!   never reused.
//! - Nonce reuse under one key is the single catastrophic failure mode of
//!   this construction. Every nonce (body and per-recipient) and every
//!   ephemeral key is drawn fresh from the caller's CSPRNG inside [`seal`];
//!   nonce values are never accepted from callers and never derived
//!   deterministically.
//! - A MAC failure while unwrapping one recipient entry is recoverable and
//!   opening continues; a MAC failure on the body is fatal and no plaintext
//!   is released.

mod error;
mod wire;

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand_core::{CryptoRng, RngCore};
use x25519_dalek::EphemeralSecret;
use zeroize::Zeroizing;

pub use error::EnvelopeError;

use crate::{
    derive::{PublicKey, SecretKey},
    fingerprint::ShortFingerprint,
};

/// XChaCha20 nonce size (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Content-encryption key size (32 bytes).
pub const CEK_SIZE: usize = 32;

/// Poly1305 tag size (16 bytes).
const POLY1305_TAG_SIZE: usize = 16;

/// Envelope algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnvelopeAlg {
    /// X25519 CEK wrap + XChaCha20-Poly1305 body and wrap AEAD
    X25519XChaCha20Poly1305 = 1,
}

impl EnvelopeAlg {
    /// Wire byte for this algorithm.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`EnvelopeAlg::to_u8`].
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::X25519XChaCha20Poly1305),
            _ => None,
        }
    }
}

/// One wrapped copy of the CEK, addressed to one recipient key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEntry {
    /// Ephemeral X25519 public key used for this entry's ECDH
    pub ephemeral_public: [u8; 32],
    /// Fresh nonce for the CEK wrap (never shared with any other entry)
    pub nonce: [u8; NONCE_SIZE],
    /// CEK sealed under the ECDH shared secret (32 bytes + 16-byte tag)
    pub wrapped_cek: Vec<u8>,
    /// Short fingerprint of the recipient key, the lookup handle on open
    pub to: ShortFingerprint,
}

/// A sealed envelope: one body ciphertext plus per-recipient CEK wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Algorithm identifier
    pub alg: EnvelopeAlg,
    /// Fresh nonce for the body AEAD
    pub body_nonce: [u8; NONCE_SIZE],
    /// Body ciphertext including the 16-byte tag
    pub body_ct: Vec<u8>,
    /// One entry per recipient
    pub recipients: Vec<RecipientEntry>,
}

impl Envelope {
    /// Plaintext length (body ciphertext minus the authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.body_ct.len().saturating_sub(POLY1305_TAG_SIZE)
    }
}

/// Seal input: a recipient public key paired with its lookup handle.
#[derive(Debug, Clone)]
pub struct Recipient {
    /// X25519 public key to wrap the CEK for
    pub public: PublicKey,
    /// Short fingerprint written into the entry's `to` field
    pub fingerprint: ShortFingerprint,
}

/// Seal `plaintext` for every key in `recipients`.
///
/// The body is encrypted once under a fresh CEK; the CEK is wrapped per
/// recipient with a fresh ephemeral keypair and a fresh nonce. `rng` must
/// be a CSPRNG (production callers pass `OsRng`).
///
/// # Errors
///
/// - `NoRecipients` for an empty recipient list
/// - `DegenerateSharedSecret` if a recipient public key is small-order
pub fn seal<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    recipients: &[Recipient],
) -> Result<Envelope, EnvelopeError> {
    if recipients.is_empty() {
        return Err(EnvelopeError::NoRecipients);
    }

    let mut cek = Zeroizing::new([0u8; CEK_SIZE]);
    rng.fill_bytes(&mut *cek);
    let mut body_nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut body_nonce);

    let body_ct = seal_body(&cek, &body_nonce, plaintext);

    let mut entries = Vec::with_capacity(recipients.len());
    for (index, recipient) in recipients.iter().enumerate() {
        entries.push(wrap_cek(rng, &cek, recipient, index)?);
    }

    Ok(Envelope {
        alg: EnvelopeAlg::X25519XChaCha20Poly1305,
        body_nonce,
        body_ct,
        recipients: entries,
    })
}

/// Open an envelope with the keys the caller holds.
///
/// `resolve` maps a recipient entry's `to` handle to the matching secret
/// key, or `None` for keys the caller does not hold. Entries are attempted
/// in order; an unwrap failure on one entry is recorded and the next entry
/// is tried.
///
/// # Errors
///
/// - `NoMatchingRecipient` if no entry resolved at all
/// - `UnwrapFailed` if entries resolved but none unwrapped
/// - `BodyAuthenticationFailed` on a body MAC mismatch (fatal, no
///   plaintext released)
pub fn open<F>(envelope: &Envelope, mut resolve: F) -> Result<Vec<u8>, EnvelopeError>
where
    F: FnMut(&ShortFingerprint) -> Option<SecretKey>,
{
    let mut last_failure = None;

    for (index, entry) in envelope.recipients.iter().enumerate() {
        let Some(secret) = resolve(&entry.to) else {
            continue;
        };
        match unwrap_cek(&secret, entry) {
            Some(cek) => return open_body(&cek, envelope),
            None => last_failure = Some(index),
        }
    }

    match last_failure {
        Some(recipient_index) => Err(EnvelopeError::UnwrapFailed { recipient_index }),
        None => Err(EnvelopeError::NoMatchingRecipient),
    }
}

/// One AEAD pass over the whole body.
fn seal_body(cek: &[u8; CEK_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(cek.into());
    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };
    ciphertext
}

/// Wrap the CEK for one recipient: fresh ephemeral ECDH, fresh nonce, the
/// raw shared secret as the AEAD key.
fn wrap_cek<R: RngCore + CryptoRng>(
    rng: &mut R,
    cek: &[u8; CEK_SIZE],
    recipient: &Recipient,
    index: usize,
) -> Result<RecipientEntry, EnvelopeError> {
    let ephemeral = EphemeralSecret::random_from_rng(&mut *rng);
    let ephemeral_public = x25519_dalek::PublicKey::from(&ephemeral).to_bytes();

    let shared =
        ephemeral.diffie_hellman(&x25519_dalek::PublicKey::from(*recipient.public.as_bytes()));
    if !shared.was_contributory() {
        return Err(EnvelopeError::DegenerateSharedSecret { recipient_index: index });
    }

    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new(shared.as_bytes().into());
    let Ok(wrapped_cek) = cipher.encrypt(XNonce::from_slice(&nonce), cek.as_slice()) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    Ok(RecipientEntry {
        ephemeral_public,
        nonce,
        wrapped_cek,
        to: recipient.fingerprint.clone(),
    })
}

/// Attempt one entry's CEK unwrap. `None` covers both a MAC mismatch and a
/// degenerate shared secret — recoverable either way.
fn unwrap_cek(secret: &SecretKey, entry: &RecipientEntry) -> Option<Zeroizing<[u8; CEK_SIZE]>> {
    let shared = x25519_dalek::StaticSecret::from(*secret.as_bytes())
        .diffie_hellman(&x25519_dalek::PublicKey::from(entry.ephemeral_public));
    if !shared.was_contributory() {
        return None;
    }

    let cipher = XChaCha20Poly1305::new(shared.as_bytes().into());
    let cek = cipher.decrypt(XNonce::from_slice(&entry.nonce), entry.wrapped_cek.as_slice()).ok()?;
    let cek: [u8; CEK_SIZE] = cek.try_into().ok()?;
    Some(Zeroizing::new(cek))
}

fn open_body(cek: &[u8; CEK_SIZE], envelope: &Envelope) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = XChaCha20Poly1305::new(cek.into());
    cipher
        .decrypt(XNonce::from_slice(&envelope.body_nonce), envelope.body_ct.as_slice())
        .map_err(|_| EnvelopeError::BodyAuthenticationFailed)
}
