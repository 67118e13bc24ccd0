//! The four observers of a run, driven together in a fixed order.

use capsule_core::{Failure, TraceEntry};
use serde::{Deserialize, Serialize};

use crate::capsule::{CapsuleObserver, CapsuleSnapshot};
use crate::consent::{ConsentObserver, ConsentSnapshot};
use crate::memory::{MemoryObserver, MemorySnapshot};
use crate::policy::{PolicyObserver, PolicySnapshot};
use crate::Observer;

/// Combined read-only view of all observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserversSnapshot {
    pub capsule: CapsuleSnapshot,
    pub consent: ConsentSnapshot,
    pub policy: PolicySnapshot,
    pub memory: MemorySnapshot,
}

/// Per-run observer instances. A fresh set is built for every run, so no
/// state crosses run boundaries.
#[derive(Debug, Default)]
pub struct ObserverSet {
    capsule: CapsuleObserver,
    consent: ConsentObserver,
    policy: PolicyObserver,
    memory: MemoryObserver,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one entry into every observer in the order capsule, consent,
    /// policy, memory. Failures are returned in that order.
    pub fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure> {
        let mut failures = self.capsule.observe(entry);
        failures.extend(self.consent.observe(entry));
        failures.extend(self.policy.observe(entry));
        failures.extend(self.memory.observe(entry));
        if !failures.is_empty() {
            tracing::debug!(
                step_index = entry.step_index,
                count = failures.len(),
                "observers reported failures"
            );
        }
        failures
    }

    pub fn snapshot(&self) -> ObserversSnapshot {
        ObserversSnapshot {
            capsule: self.capsule.snapshot(),
            consent: self.consent.snapshot(),
            policy: self.policy.snapshot(),
            memory: self.memory.snapshot(),
        }
    }
}
