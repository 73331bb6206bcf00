//! Ironkey Cryptographic Core
//!
//! Deterministic hierarchical key derivation from one root seed, and hybrid
//! multi-recipient envelopes built on the derived keys. Pure functions of
//! their inputs plus fresh randomness: no I/O, no global state, no async.
//!
//! # Key Hierarchy
//!
//! One root seed feeds two purpose-built, domain-separated branches:
//!
//! ```text
//! Root Seed
//!    │
//!    ├── HMAC-SHA512 hardened chain ──► Ed25519 keys (identity/signing)
//!    │     account / role / index, all hardened
//!    │
//!    └── HKDF-SHA512, path as info ──► X25519 keys (key agreement)
//! ```
//!
//! Keys are addressed by canonical path strings
//! (`ik:v1:<curve>/<account>/<role>/<index>`) and displayed by SHA-256
//! fingerprints in full or tagged-short Base58 form. Derivation is
//! deterministic: for fixed seed bytes and a fixed path string, every
//! conforming implementation reproduces byte-exact secret and public keys.
//!
//! # Envelopes
//!
//! [`envelope::seal`] encrypts one body once under a fresh content key and
//! wraps that key per recipient via ephemeral X25519 ECDH, so a 10 MB body
//! for five recipients costs one body pass plus five 32-byte wraps.
//!
//! # Security
//!
//! - Signing and key-agreement keys are never cross-used: the curve is part
//!   of the path and each deriver rejects the other branch's paths.
//! - All chain segments are hardened; a leaked child key cannot
//!   reconstruct its parent.
//! - Secret scalars, chain keys, and content keys are zeroized on drop.
//! - Every nonce and ephemeral key is drawn from a CSPRNG inside `seal`;
//!   nonce reuse is the construction's one catastrophic failure mode and no
//!   API accepts caller-chosen nonce values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod derive;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod path;

pub use derive::{KeyPair, PublicKey, SecretKey, derive, derive_ed25519, derive_x25519};
pub use envelope::{Envelope, EnvelopeAlg, EnvelopeError, Recipient, RecipientEntry, open, seal};
pub use error::DeriveError;
pub use fingerprint::{Fingerprint, SHORT_PREFIX_LEN, ShortFingerprint};
pub use path::{Curve, DerivationPath, PATH_PREFIX, Role};
