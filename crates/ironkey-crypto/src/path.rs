//! Canonical derivation-path strings.
//!
//! A path names exactly one derived key:
//!
//! ```text
//! ik:v1:<curve>/<account>/<role>/<index>
//! ```
//!
//! Parsing is strict: only the canonical rendering is accepted (no leading
//! zeros, no whitespace, known curve and role names only), so
//! `DerivationPath::parse` and `Display` are exact inverses in both
//! directions. Pure string work, no I/O.
//!
//! # Invariants
//!
//! - Role names map through the fixed v1 table below. The table is
//!   compatibility-critical: changing a discriminant invalidates every key
//!   derived under the old mapping. Role strings are never hashed.
//! - A path is an immutable value type; derivation is a pure function of
//!   `(seed, path)`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::DeriveError;

/// Prefix carried by every canonical v1 path string.
pub const PATH_PREFIX: &str = "ik:v1:";

/// Curve branch a path derives on.
///
/// The two branches use different KDF constructions and are never
/// cross-used: Ed25519 keys sign, X25519 keys agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// Signing/identity branch (hardened HMAC-SHA512 chain)
    Ed25519,
    /// Key-agreement branch (flat HKDF-SHA512)
    X25519,
}

impl Curve {
    /// Canonical lowercase name used in path strings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::X25519 => "x25519",
        }
    }

    /// Tag prepended to short-fingerprint display strings.
    pub fn fingerprint_tag(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed1",
            Self::X25519 => "x1",
        }
    }

    /// Inverse of [`Curve::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ed25519" => Some(Self::Ed25519),
            "x25519" => Some(Self::X25519),
            _ => None,
        }
    }

    /// Inverse of [`Curve::fingerprint_tag`].
    pub fn from_fingerprint_tag(tag: &str) -> Option<Self> {
        match tag {
            "ed1" => Some(Self::Ed25519),
            "x1" => Some(Self::X25519),
            _ => None,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key role within an account.
///
/// The discriminants are the v1 role table: the integers fed into the
/// hardened Ed25519 chain. Frozen — see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Role {
    /// Long-lived identity key
    Identity = 0,
    /// Day-to-day signing key
    Signing = 1,
    /// Envelope encryption key
    Encryption = 2,
    /// Login/session authentication key
    Authentication = 3,
    /// Account recovery key
    Recovery = 4,
}

impl Role {
    /// Every role in the v1 table.
    pub const ALL: [Role; 5] =
        [Self::Identity, Self::Signing, Self::Encryption, Self::Authentication, Self::Recovery];

    /// Canonical lowercase name used in path strings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Signing => "signing",
            Self::Encryption => "encryption",
            Self::Authentication => "authentication",
            Self::Recovery => "recovery",
        }
    }

    /// Fixed integer fed into the hardened chain for this role.
    pub fn chain_id(self) -> u32 {
        self as u32
    }

    /// Inverse of [`Role::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One derivation path: `(curve, account, role, index)`.
///
/// Immutable value type. `Display` renders the canonical string and
/// [`DerivationPath::parse`] accepts exactly that rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    /// Curve branch
    pub curve: Curve,
    /// Account number
    pub account: u32,
    /// Role within the account
    pub role: Role,
    /// Rotation index (incremented by key rotation, never reset)
    pub index: u32,
}

impl DerivationPath {
    /// Build a path from its components.
    pub fn new(curve: Curve, account: u32, role: Role, index: u32) -> Self {
        Self { curve, account, role, index }
    }

    /// Parse a canonical path string.
    ///
    /// # Errors
    ///
    /// `InvalidPath` unless `s` is exactly `ik:v1:<curve>/<account>/<role>/
    /// <index>` with a known curve, a role from the v1 table, and canonical
    /// decimal integers (no leading zeros, no signs).
    pub fn parse(s: &str) -> Result<Self, DeriveError> {
        let Some(rest) = s.strip_prefix(PATH_PREFIX) else {
            return Err(DeriveError::invalid_path(s, format!("missing `{PATH_PREFIX}` prefix")));
        };

        let mut segments = rest.split('/');
        let (Some(curve), Some(account), Some(role), Some(index), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(DeriveError::invalid_path(s, "expected <curve>/<account>/<role>/<index>"));
        };

        let curve = Curve::from_name(curve)
            .ok_or_else(|| DeriveError::invalid_path(s, format!("unknown curve `{curve}`")))?;
        let account = parse_u32(account, "account", s)?;
        let role = Role::from_name(role)
            .ok_or_else(|| DeriveError::invalid_path(s, format!("unknown role `{role}`")))?;
        let index = parse_u32(index, "index", s)?;

        Ok(Self { curve, account, role, index })
    }
}

/// Canonical decimal `u32`: ASCII digits only, no leading zeros except `0`.
fn parse_u32(segment: &str, what: &str, path: &str) -> Result<u32, DeriveError> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment.len() == 1 || !segment.starts_with('0'));
    if !canonical {
        return Err(DeriveError::invalid_path(
            path,
            format!("{what} `{segment}` is not a canonical decimal integer"),
        ));
    }
    segment
        .parse()
        .map_err(|_| DeriveError::invalid_path(path, format!("{what} `{segment}` exceeds u32")))
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PATH_PREFIX}{}/{}/{}/{}", self.curve, self.account, self.role, self.index)
    }
}

impl FromStr for DerivationPath {
    type Err = DeriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Serialized as the canonical string so the persistence collaborator sees
// `{path: String, ...}` rows.
impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_exact_inverse() {
        let path = DerivationPath::new(Curve::Ed25519, 0, Role::Identity, 0);
        assert_eq!(path.to_string(), "ik:v1:ed25519/0/identity/0");
        assert_eq!(DerivationPath::parse("ik:v1:ed25519/0/identity/0").unwrap(), path);
    }

    #[test]
    fn round_trip_all_roles_and_curves() {
        for curve in [Curve::Ed25519, Curve::X25519] {
            for role in Role::ALL {
                let path = DerivationPath::new(curve, 7, role, 42);
                assert_eq!(DerivationPath::parse(&path.to_string()).unwrap(), path);
            }
        }
    }

    #[test]
    fn round_trip_boundary_integers() {
        let path = DerivationPath::new(Curve::X25519, u32::MAX, Role::Encryption, u32::MAX);
        assert_eq!(DerivationPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn rejects_wrong_prefix() {
        for s in ["ed25519/0/identity/0", "ik:v2:ed25519/0/identity/0", "IK:v1:ed25519/0/identity/0"] {
            assert!(matches!(DerivationPath::parse(s), Err(DeriveError::InvalidPath { .. })), "{s}");
        }
    }

    #[test]
    fn rejects_unknown_curve_and_role() {
        assert!(DerivationPath::parse("ik:v1:secp256k1/0/identity/0").is_err());
        assert!(DerivationPath::parse("ik:v1:ed25519/0/treasury/0").is_err());
    }

    #[test]
    fn rejects_non_canonical_integers() {
        for s in [
            "ik:v1:ed25519/00/identity/0",
            "ik:v1:ed25519/0/identity/01",
            "ik:v1:ed25519/+1/identity/0",
            "ik:v1:ed25519/0x1/identity/0",
            "ik:v1:ed25519/ 0/identity/0",
            "ik:v1:ed25519//identity/0",
            "ik:v1:ed25519/4294967296/identity/0",
        ] {
            assert!(DerivationPath::parse(s).is_err(), "{s}");
        }
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(DerivationPath::parse("ik:v1:ed25519/0/identity").is_err());
        assert!(DerivationPath::parse("ik:v1:ed25519/0/identity/0/9").is_err());
    }

    #[test]
    fn role_table_is_frozen() {
        // v1 mapping; any change here breaks every derived key.
        assert_eq!(Role::Identity.chain_id(), 0);
        assert_eq!(Role::Signing.chain_id(), 1);
        assert_eq!(Role::Encryption.chain_id(), 2);
        assert_eq!(Role::Authentication.chain_id(), 3);
        assert_eq!(Role::Recovery.chain_id(), 4);
    }

    #[test]
    fn fingerprint_tags() {
        assert_eq!(Curve::Ed25519.fingerprint_tag(), "ed1");
        assert_eq!(Curve::X25519.fingerprint_tag(), "x1");
        assert_eq!(Curve::from_fingerprint_tag("ed1"), Some(Curve::Ed25519));
        assert_eq!(Curve::from_fingerprint_tag("x1"), Some(Curve::X25519));
        assert_eq!(Curve::from_fingerprint_tag("ed2"), None);
    }

    #[test]
    fn serde_uses_canonical_string() {
        let path = DerivationPath::new(Curve::X25519, 1, Role::Encryption, 3);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"ik:v1:x25519/1/encryption/3\"");
        let back: DerivationPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
