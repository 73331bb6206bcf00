//! Key lifecycle states and the rotation policy rules over them.
//!
//! ```text
//! Inactive ──► Active ──► Deprecated ──► Revoked (terminal)
//!     │           │                        ▲
//!     └───────────┴────────────────────────┘
//! ```
//!
//! Rotation only moves which path is *current* for a role line; it never
//! deletes a path's derivability, since every path is a pure function of
//! the seed and fixed integers. Revoked keys stay resolvable for
//! decrypting pre-existing envelopes but are never offered for new
//! encryption.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a registered key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Registered but not yet the current key for its role line
    Inactive,
    /// Current key for its role line; the only valid encryption target
    Active,
    /// Superseded by rotation; still resolvable for old envelopes
    Deprecated,
    /// Withdrawn; resolvable for old envelopes, never for new encryption
    Revoked,
}

impl LifecycleState {
    /// True if `self → to` is a legal transition.
    pub fn can_transition(self, to: LifecycleState) -> bool {
        matches!(
            (self, to),
            (Self::Inactive, Self::Active)
                | (Self::Active, Self::Deprecated)
                | (Self::Inactive | Self::Active | Self::Deprecated, Self::Revoked)
        )
    }

    /// True if new envelopes may be addressed to a key in this state.
    pub fn is_encryption_target(self) -> bool {
        matches!(self, Self::Active)
    }

    /// True if no further transitions leave this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use LifecycleState::{Active, Deprecated, Inactive, Revoked};

        assert!(Inactive.can_transition(Active));
        assert!(Active.can_transition(Deprecated));
        assert!(Inactive.can_transition(Revoked));
        assert!(Active.can_transition(Revoked));
        assert!(Deprecated.can_transition(Revoked));
    }

    #[test]
    fn illegal_transitions() {
        use LifecycleState::{Active, Deprecated, Inactive, Revoked};

        assert!(!Inactive.can_transition(Deprecated));
        assert!(!Active.can_transition(Inactive));
        assert!(!Deprecated.can_transition(Active));
        assert!(!Revoked.can_transition(Active));
        assert!(!Revoked.can_transition(Deprecated));
        assert!(!Revoked.can_transition(Inactive));
    }

    #[test]
    fn only_active_keys_take_new_encryption() {
        assert!(LifecycleState::Active.is_encryption_target());
        assert!(!LifecycleState::Inactive.is_encryption_target());
        assert!(!LifecycleState::Deprecated.is_encryption_target());
        assert!(!LifecycleState::Revoked.is_encryption_target());
    }

    #[test]
    fn revoked_is_terminal() {
        assert!(LifecycleState::Revoked.is_terminal());
        assert!(!LifecycleState::Deprecated.is_terminal());
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&LifecycleState::Deprecated).unwrap();
        assert_eq!(json, "\"deprecated\"");
    }
}
