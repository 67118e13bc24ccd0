//! # Consent Observer
//!
//! ## States
//!
//! UNKNOWN → ASSERTED ⇄ REVOKED
//!
//! A `CONSENT_ASSERTION` records its granted scopes keyed by the asserting
//! capsule's hash. A `CONSENT_REVOCATION` carries no scoping information,
//! so it clears every active scope.

use std::collections::BTreeMap;

use capsule_core::{CapsuleEvent, CapsuleHash, Failure, TraceEntry};
use serde::{Deserialize, Serialize};

use crate::Observer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentState {
    #[default]
    Unknown,
    Asserted,
    Revoked,
}

impl std::fmt::Display for ConsentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::Asserted => "ASSERTED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSnapshot {
    pub state: ConsentState,
    pub assertion_capsule_hash: Option<CapsuleHash>,
    pub revocation_capsule_hash: Option<CapsuleHash>,
    /// Consent capsule hash → granted scopes.
    pub active_scopes: BTreeMap<String, Vec<String>>,
}

impl ConsentSnapshot {
    /// Scopes granted by the consent with hash `consent`, if it is active.
    pub fn scopes_for(&self, consent: &str) -> Option<&[String]> {
        self.active_scopes.get(consent).map(Vec::as_slice)
    }
}

#[derive(Debug, Default)]
pub struct ConsentObserver {
    state: ConsentSnapshot,
}

impl ConsentObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current consent state.
    pub fn state(&self) -> ConsentState {
        self.state.state
    }
}

impl Observer for ConsentObserver {
    type Snapshot = ConsentSnapshot;

    fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure> {
        match &entry.event {
            CapsuleEvent::ConsentAssertion { scope } => {
                self.state.state = ConsentState::Asserted;
                self.state.assertion_capsule_hash = entry.capsule_hash().cloned();
                self.state.revocation_capsule_hash = None;
                // Scopes are keyed by hash; an unhashed assertion grants nothing.
                if let Some(hash) = entry.capsule_hash() {
                    self.state
                        .active_scopes
                        .insert(hash.as_str().to_string(), scope.clone());
                }
                tracing::debug!(
                    step_index = entry.step_index,
                    scopes = scope.len(),
                    "consent asserted"
                );
            }
            CapsuleEvent::ConsentRevocation => {
                self.state.state = ConsentState::Revoked;
                self.state.revocation_capsule_hash = entry.capsule_hash().cloned();
                let cleared = self.state.active_scopes.len();
                self.state.active_scopes.clear();
                tracing::debug!(step_index = entry.step_index, cleared, "consent revoked");
            }
            CapsuleEvent::PolicyAssertion { .. }
            | CapsuleEvent::PolicyRevocation { .. }
            | CapsuleEvent::MemoryRequest(_)
            | CapsuleEvent::MemoryCommit { .. }
            | CapsuleEvent::MemoryReference(_)
            | CapsuleEvent::Unhandled(_) => {}
        }
        Vec::new()
    }

    fn snapshot(&self) -> ConsentSnapshot {
        self.state.clone()
    }
}
