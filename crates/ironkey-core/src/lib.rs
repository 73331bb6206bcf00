//! Ironkey Core
//!
//! Bookkeeping layer over [`ironkey_crypto`]: a seed-source abstraction, a
//! key lifecycle state machine, and a registry that tracks
//! path → fingerprint → state without ever persisting secret material.
//!
//! # Design
//!
//! - No ambient state: every registry is an explicit value owning its seed
//!   handle and path table, so concurrent use is a plain ownership
//!   question.
//! - Secrets are re-derived on demand and dropped after use; persisted
//!   bookkeeping leaks structure, never keys.
//! - Rotation and revocation mutate which path is *current*; derivability
//!   of old paths is never deleted, keeping historical envelopes
//!   decryptable.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod seed;

pub use error::RegistryError;
pub use lifecycle::LifecycleState;
pub use registry::{KeyRegistry, RegisteredKey, RegistryConfig};
pub use seed::{MemorySeedSource, Seed, SeedSource};
