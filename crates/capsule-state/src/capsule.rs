//! Descriptive tally of every observed capsule. Never fails.

use std::collections::BTreeMap;

use capsule_core::{Failure, TraceEntry};
use serde::{Deserialize, Serialize};

use crate::Observer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleSnapshot {
    pub total_count: usize,
    pub count_by_type: BTreeMap<String, usize>,
    pub ordered_types: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CapsuleObserver {
    state: CapsuleSnapshot,
}

impl CapsuleObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for CapsuleObserver {
    type Snapshot = CapsuleSnapshot;

    fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure> {
        let label = entry.capsule.capsule_type.as_str().to_string();
        self.state.total_count += 1;
        *self.state.count_by_type.entry(label.clone()).or_insert(0) += 1;
        self.state.ordered_types.push(label);
        Vec::new()
    }

    fn snapshot(&self) -> CapsuleSnapshot {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::entry;
    use capsule_core::CapsuleType;
    use serde_json::json;

    #[test]
    fn test_counts_and_order() {
        let mut obs = CapsuleObserver::new();
        for (i, t) in [
            CapsuleType::State,
            CapsuleType::ConsentAssertion,
            CapsuleType::State,
            CapsuleType::Other("X".into()),
        ]
        .into_iter()
        .enumerate()
        {
            assert!(obs.observe(&entry(i, t, Some(json!({})))).is_empty());
        }
        let snap = obs.snapshot();
        assert_eq!(snap.total_count, 4);
        assert_eq!(snap.count_by_type["STATE"], 2);
        assert_eq!(snap.count_by_type["X"], 1);
        assert_eq!(
            snap.ordered_types,
            vec!["STATE", "CONSENT_ASSERTION", "STATE", "X"]
        );
    }

    #[test]
    fn test_counts_unhashed_entries() {
        let mut obs = CapsuleObserver::new();
        obs.observe(&entry(0, CapsuleType::MemoryCommit, None));
        assert_eq!(obs.snapshot().total_count, 1);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut obs = CapsuleObserver::new();
        obs.observe(&entry(0, CapsuleType::State, Some(json!({}))));
        assert_eq!(obs.snapshot(), obs.snapshot());
    }
}
