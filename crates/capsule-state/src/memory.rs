//! Classifies memory capsules into requests, commits and references.
//! Produces no failures; enforcement reads commit state from the trace
//! entry and the consent snapshot.

use capsule_core::{CapsuleEvent, CapsuleHash, CapsuleType, Failure, MemoryRecord, TraceEntry};
use serde::{Deserialize, Serialize};

use crate::Observer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    #[serde(rename = "type")]
    pub kind: CapsuleType,
    pub memory_id: Option<String>,
    pub actor: Option<String>,
    pub capsule_hash: Option<CapsuleHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub requests: Vec<MemoryEvent>,
    pub commits: Vec<MemoryEvent>,
    pub references: Vec<MemoryEvent>,
}

#[derive(Debug, Default)]
pub struct MemoryObserver {
    state: MemorySnapshot,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

fn memory_event(
    entry: &TraceEntry,
    record: &MemoryRecord,
    consent_reference: Option<&String>,
) -> MemoryEvent {
    MemoryEvent {
        kind: entry.capsule.capsule_type.clone(),
        memory_id: record.memory_id.clone(),
        actor: record.actor.clone(),
        capsule_hash: entry.capsule_hash().cloned(),
        consent_reference: consent_reference.cloned(),
    }
}

impl Observer for MemoryObserver {
    type Snapshot = MemorySnapshot;

    fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure> {
        match &entry.event {
            CapsuleEvent::MemoryRequest(record) => {
                self.state.requests.push(memory_event(entry, record, None));
            }
            CapsuleEvent::MemoryCommit {
                record,
                consent_reference,
            } => {
                self.state
                    .commits
                    .push(memory_event(entry, record, consent_reference.as_ref()));
            }
            CapsuleEvent::MemoryReference(record) => {
                self.state.references.push(memory_event(entry, record, None));
            }
            CapsuleEvent::ConsentAssertion { .. }
            | CapsuleEvent::ConsentRevocation
            | CapsuleEvent::PolicyAssertion { .. }
            | CapsuleEvent::PolicyRevocation { .. }
            | CapsuleEvent::Unhandled(_) => {}
        }
        Vec::new()
    }

    fn snapshot(&self) -> MemorySnapshot {
        self.state.clone()
    }
}
