//! Public-key fingerprints: SHA-256 digests with Base58 display forms.
//!
//! A fingerprint is the SHA-256 of a 32-byte public key. It has exactly two
//! display encodings, never separate storage:
//!
//! - full: Base58 of all 32 digest bytes
//! - short: `<tag>-` + Base58 of the first 10 digest bytes, tag `ed1`/`x1`
//!
//! The short form is a lookup and display aid only. Only 10 of 32 bytes are
//! recoverable from it, so it is never a canonical identifier: anything
//! resolved by short form must have its full digest re-verified.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{derive::PublicKey, path::Curve};

/// Digest bytes encoded in the short display form.
pub const SHORT_PREFIX_LEN: usize = 10;

/// SHA-256 digest of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint a public key.
    pub fn of(public: &PublicKey) -> Self {
        Self(Sha256::digest(public.as_bytes()).into())
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full display form: Base58 of all 32 bytes.
    pub fn full(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Short display form for the given curve's tag.
    pub fn short(&self, curve: Curve) -> ShortFingerprint {
        let mut prefix = [0u8; SHORT_PREFIX_LEN];
        prefix.copy_from_slice(&self.0[..SHORT_PREFIX_LEN]);
        ShortFingerprint { curve, prefix }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

// Serialized as the full Base58 string, matching the persisted
// `{fingerprint: String}` record shape.
impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = bs58::decode(&s).into_vec().map_err(de::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| de::Error::custom("fingerprint must decode to 32 bytes"))?;
        Ok(Self(bytes))
    }
}

/// Tagged 10-byte fingerprint prefix: `ed1-…` / `x1-…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortFingerprint {
    curve: Curve,
    prefix: [u8; SHORT_PREFIX_LEN],
}

impl ShortFingerprint {
    /// Curve tag carried by this short form.
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The encoded digest prefix.
    pub fn prefix(&self) -> &[u8; SHORT_PREFIX_LEN] {
        &self.prefix
    }

    /// True if this short form is a prefix of `full`.
    ///
    /// A `true` here is a candidate match only — callers must still compare
    /// the re-derived full digest before trusting the key.
    pub fn matches(&self, full: &Fingerprint) -> bool {
        full.as_bytes().starts_with(&self.prefix)
    }
}

impl fmt::Display for ShortFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.curve.fingerprint_tag(), bs58::encode(&self.prefix).into_string())
    }
}

/// Error from parsing a short-fingerprint display string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid short fingerprint `{input}`: {reason}")]
pub struct ShortFingerprintParseError {
    /// The rejected input
    pub input: String,
    /// What made it invalid
    pub reason: &'static str,
}

impl FromStr for ShortFingerprint {
    type Err = ShortFingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = |reason| ShortFingerprintParseError { input: s.to_string(), reason };

        let (tag, digits) = s.split_once('-').ok_or_else(|| reject("missing `-` separator"))?;
        let curve = Curve::from_fingerprint_tag(tag).ok_or_else(|| reject("unknown tag"))?;
        let bytes =
            bs58::decode(digits).into_vec().map_err(|_| reject("prefix is not Base58"))?;
        let prefix: [u8; SHORT_PREFIX_LEN] =
            bytes.try_into().map_err(|_| reject("prefix must decode to 10 bytes"))?;

        Ok(Self { curve, prefix })
    }
}

impl Serialize for ShortFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShortFingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
