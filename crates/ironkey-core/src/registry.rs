//! Path → fingerprint → lifecycle bookkeeping.
//!
//! The registry holds no secret material. `register` derives once to
//! record a fingerprint and discards the secret (unless the opt-in cache
//! is enabled); `resolve` re-derives on demand from the seed source. A
//! compromise of persisted bookkeeping therefore leaks structure — which
//! paths exist and their states — but no key bytes.
//!
//! # Concurrency
//!
//! Mutating operations take `&mut self` and need external mutual
//! exclusion. `resolve`/`encryption_key` take `&self` and can run against
//! a shared snapshot.

use std::{collections::HashMap, time::SystemTime};

use ironkey_crypto::{
    Curve, DerivationPath, Fingerprint, KeyPair, Role, SecretKey, ShortFingerprint, derive,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::RegistryError, lifecycle::LifecycleState, seed::SeedSource};

/// Bookkeeping row for one registered key. Holds no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredKey {
    /// Derivation path the key lives at
    pub path: DerivationPath,
    /// Full fingerprint of the derived public key
    pub fingerprint: Fingerprint,
    /// Short display form used as a lookup handle
    pub short: ShortFingerprint,
    /// Current lifecycle state
    pub state: LifecycleState,
    /// Registration time
    pub created_at: SystemTime,
}

/// Registry behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryConfig {
    /// Keep derived keypairs in memory instead of re-deriving per resolve.
    ///
    /// Off by default: the secret then exists only for the duration of
    /// each call. Enable only where the caller's threat model accepts
    /// long-lived secrets in process memory.
    pub cache_secrets: bool,
}

/// Key registry: lifecycle state machine over derivation paths.
#[derive(Debug)]
pub struct KeyRegistry<S> {
    seed_source: S,
    config: RegistryConfig,
    keys: HashMap<DerivationPath, RegisteredKey>,
    /// Rows revoked by [`KeyRegistry::rotate_all`]; kept for the
    /// persistence collaborator, no longer resolvable under the new seed.
    retired: Vec<RegisteredKey>,
    cache: HashMap<DerivationPath, KeyPair>,
}

impl<S: SeedSource> KeyRegistry<S> {
    /// Create a registry with default configuration (no secret cache).
    pub fn new(seed_source: S) -> Self {
        Self::with_config(seed_source, RegistryConfig::default())
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(seed_source: S, config: RegistryConfig) -> Self {
        Self {
            seed_source,
            config,
            keys: HashMap::new(),
            retired: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Register a path: derive once, record the fingerprint, discard the
    /// secret.
    ///
    /// New keys start `Inactive`; see [`KeyRegistry::activate`].
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if the path has a row
    /// - `SeedUnavailable` / derivation errors from the one-time derive
    pub fn register(&mut self, path: DerivationPath) -> Result<&RegisteredKey, RegistryError> {
        if self.keys.contains_key(&path) {
            return Err(RegistryError::AlreadyRegistered { path: path.to_string() });
        }

        let pair = self.derive_pair(&path)?;
        let fingerprint = Fingerprint::of(&pair.public);
        let short = fingerprint.short(path.curve);

        if self.keys.values().any(|record| record.short == short) {
            warn!(%short, "short-fingerprint prefix collision among registered keys");
        }
        if self.config.cache_secrets {
            self.cache.insert(path.clone(), pair);
        }

        let record = RegisteredKey {
            path: path.clone(),
            fingerprint,
            short,
            state: LifecycleState::Inactive,
            created_at: SystemTime::now(),
        };
        info!(path = %record.path, fingerprint = %record.fingerprint, "registered key");

        Ok(self.keys.entry(path).or_insert(record))
    }

    /// Make `path` the current key for its `(curve, account, role)` line.
    ///
    /// Any sibling that was `Active` is deprecated: a role line has at
    /// most one active key.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` for an unregistered path
    /// - `InvalidTransition` unless the key is `Inactive`
    pub fn activate(&mut self, path: &DerivationPath) -> Result<(), RegistryError> {
        let current = self
            .keys
            .get(path)
            .ok_or_else(|| RegistryError::KeyNotFound { query: path.to_string() })?
            .state;
        if !current.can_transition(LifecycleState::Active) {
            return Err(RegistryError::InvalidTransition {
                path: path.to_string(),
                from: current,
                to: LifecycleState::Active,
            });
        }

        for record in self.keys.values_mut() {
            if record.path != *path
                && record.state == LifecycleState::Active
                && same_line(&record.path, path)
            {
                record.state = LifecycleState::Deprecated;
                info!(path = %record.path, "deprecated superseded key");
            }
        }
        if let Some(record) = self.keys.get_mut(path) {
            record.state = LifecycleState::Active;
            info!(path = %record.path, "activated key");
        }
        Ok(())
    }

    /// Re-derive the keypair for a full or short fingerprint string.
    ///
    /// Keys in any lifecycle state resolve — deprecated and revoked keys
    /// stay available for decrypting pre-existing envelopes. Short-form
    /// matches are re-verified against the recorded full digest.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if nothing matches (or re-verification fails)
    /// - `FingerprintCollision` if a short form matches several rows
    pub fn resolve(&self, query: &str) -> Result<KeyPair, RegistryError> {
        let record = self.find_record(query)?;
        self.derive_verified(record, query)
    }

    /// [`KeyRegistry::resolve`] for an already-parsed short fingerprint.
    pub fn resolve_short(&self, short: &ShortFingerprint) -> Result<KeyPair, RegistryError> {
        let record = self.find_by_short(short)?;
        self.derive_verified(record, &short.to_string())
    }

    /// Resolve a key for use as a *new* encryption target.
    ///
    /// # Errors
    ///
    /// `NotEncryptable` for any non-`Active` key — revoked and deprecated
    /// keys keep resolving through [`KeyRegistry::resolve`] but are never
    /// offered for new envelopes.
    pub fn encryption_key(&self, query: &str) -> Result<KeyPair, RegistryError> {
        let record = self.find_record(query)?;
        if !record.state.is_encryption_target() {
            return Err(RegistryError::NotEncryptable {
                path: record.path.to_string(),
                state: record.state,
            });
        }
        self.derive_verified(record, query)
    }

    /// Rotate the active key of a role line to the next index.
    ///
    /// The old key becomes `Deprecated` (still derivable, still resolving
    /// for old envelopes); the successor is registered and activated.
    /// Returns the successor path.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if the line has no active key
    /// - `IndexExhausted` at index `u32::MAX`
    pub fn rotate(
        &mut self,
        curve: Curve,
        account: u32,
        role: Role,
    ) -> Result<DerivationPath, RegistryError> {
        let current = self
            .keys
            .values()
            .find(|record| {
                record.state == LifecycleState::Active
                    && record.path.curve == curve
                    && record.path.account == account
                    && record.path.role == role
            })
            .ok_or_else(|| RegistryError::KeyNotFound {
                query: format!("active {curve} key for account {account} role {role}"),
            })?;

        let old_path = current.path.clone();
        let next_index = old_path
            .index
            .checked_add(1)
            .ok_or_else(|| RegistryError::IndexExhausted { path: old_path.to_string() })?;
        let next = DerivationPath::new(curve, account, role, next_index);

        self.register(next.clone())?;
        self.activate(&next)?;

        info!(old = %old_path, new = %next, "rotated key");
        Ok(next)
    }

    /// Move a key to `Revoked`. Idempotent: revoking a revoked key is a
    /// no-op. Derivability is untouched — the path still resolves for
    /// historical decryption.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` for an unregistered path.
    pub fn revoke(&mut self, path: &DerivationPath) -> Result<(), RegistryError> {
        let record = self
            .keys
            .get_mut(path)
            .ok_or_else(|| RegistryError::KeyNotFound { query: path.to_string() })?;
        if record.state == LifecycleState::Revoked {
            return Ok(());
        }

        record.state = LifecycleState::Revoked;
        self.cache.remove(path);
        info!(%path, "revoked key");
        Ok(())
    }

    /// Suspected-seed-compromise response: revoke every key, swap in a new
    /// seed source, and register + activate a fresh index-0 key for every
    /// role line that existed under the old seed.
    ///
    /// The revoked rows remain visible through [`KeyRegistry::records`]
    /// for the persistence collaborator, but no longer resolve here — a
    /// caller that still needs historical decryption keeps a registry per
    /// seed generation.
    pub fn rotate_all(&mut self, new_source: S) -> Result<Vec<DerivationPath>, RegistryError> {
        let mut lines: Vec<(Curve, u32, Role)> = Vec::new();
        for record in self.keys.values() {
            let line = (record.path.curve, record.path.account, record.path.role);
            if !lines.contains(&line) {
                lines.push(line);
            }
        }

        for (_, mut record) in std::mem::take(&mut self.keys) {
            record.state = LifecycleState::Revoked;
            self.retired.push(record);
        }
        self.cache.clear();
        self.seed_source = new_source;

        let mut fresh = Vec::with_capacity(lines.len());
        for (curve, account, role) in lines {
            let path = DerivationPath::new(curve, account, role, 0);
            self.register(path.clone())?;
            self.activate(&path)?;
            fresh.push(path);
        }

        warn!(
            revoked = self.retired.len(),
            fresh = fresh.len(),
            "rotated all keys under a new seed"
        );
        Ok(fresh)
    }

    /// Bookkeeping row for a path, if registered.
    pub fn get(&self, path: &DerivationPath) -> Option<&RegisteredKey> {
        self.keys.get(path)
    }

    /// All bookkeeping rows, retired ones first — the input for the
    /// persistence collaborator.
    pub fn records(&self) -> impl Iterator<Item = &RegisteredKey> {
        self.retired.iter().chain(self.keys.values())
    }

    /// Resolver closure for [`ironkey_crypto::envelope::open`].
    ///
    /// Returns secrets only for registered handles; collisions and
    /// re-verification failures resolve to `None`, which the opener
    /// treats as "key not held".
    pub fn envelope_resolver(&self) -> impl Fn(&ShortFingerprint) -> Option<SecretKey> + '_ {
        |short| self.resolve_short(short).ok().map(|pair| pair.secret)
    }

    /// Re-derive and verify against the recorded full digest.
    ///
    /// Short-form lookups only guarantee a 10-byte prefix; the full
    /// digest comparison is what makes the result trustworthy. A mismatch
    /// also catches a seed source that changed since registration.
    fn derive_verified(
        &self,
        record: &RegisteredKey,
        query: &str,
    ) -> Result<KeyPair, RegistryError> {
        let pair = self.derive_pair(&record.path)?;
        if Fingerprint::of(&pair.public) != record.fingerprint {
            return Err(RegistryError::KeyNotFound { query: query.to_string() });
        }
        Ok(pair)
    }

    fn derive_pair(&self, path: &DerivationPath) -> Result<KeyPair, RegistryError> {
        if let Some(pair) = self.cache.get(path) {
            return Ok(pair.clone());
        }
        let seed = self.seed_source.seed()?;
        Ok(derive(seed.as_bytes(), path)?)
    }

    fn find_record(&self, query: &str) -> Result<&RegisteredKey, RegistryError> {
        if let Ok(short) = query.parse::<ShortFingerprint>() {
            return self.find_by_short(&short);
        }
        self.keys
            .values()
            .find(|record| record.fingerprint.full() == query)
            .ok_or_else(|| RegistryError::KeyNotFound { query: query.to_string() })
    }

    fn find_by_short(&self, short: &ShortFingerprint) -> Result<&RegisteredKey, RegistryError> {
        let mut candidates = self.keys.values().filter(|record| record.short == *short);
        let Some(first) = candidates.next() else {
            return Err(RegistryError::KeyNotFound { query: short.to_string() });
        };
        if candidates.next().is_some() {
            warn!(%short, "short-fingerprint collision on lookup");
            return Err(RegistryError::FingerprintCollision { short: short.to_string() });
        }
        Ok(first)
    }
}

/// Same `(curve, account, role)` rotation line.
fn same_line(a: &DerivationPath, b: &DerivationPath) -> bool {
    a.curve == b.curve && a.account == b.account && a.role == b.role
}
