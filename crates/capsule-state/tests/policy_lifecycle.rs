//! Replays a consent → policy → revocation sequence through a full
//! observer set and checks the combined snapshot after each step.

use capsule_core::{CapsuleEvent, CapsuleHash, CapsuleMeta, CapsuleType, FailureCode, TraceEntry};
use capsule_state::{ConsentState, ObserverSet};
use serde_json::{json, Value};

fn hash(step: usize) -> CapsuleHash {
    CapsuleHash::parse(&format!("cap_{:032x}", step + 0xabc)).unwrap()
}

fn entry(step: usize, payload: Value) -> TraceEntry {
    let capsule_type = CapsuleType::of(&payload);
    TraceEntry {
        step_index: step,
        step_name: format!("step {step}"),
        capsule: CapsuleMeta {
            capsule_type: capsule_type.clone(),
            capsule_path: format!("capsules/{step}.json"),
            canonical_json: Some(payload.to_string()),
            hash_hex: Some(hash(step).hex().to_string()),
            capsule_hash: Some(hash(step)),
        },
        event: CapsuleEvent::decode(&capsule_type, &payload),
    }
}

#[test]
fn policy_lifecycle_through_observer_set() {
    let mut set = ObserverSet::new();
    let consent = hash(0);

    let steps = vec![
        json!({"capsule_type": "CONSENT_ASSERTION", "consent": {"scope": ["memory_commit"]}}),
        json!({"capsule_type": "POLICY_ASSERTION", "capsule_id": "retention",
               "policy": {"authority_basis": consent.as_str()}}),
        json!({"capsule_type": "POLICY_REVOCATION",
               "revocation": {"authority_basis": consent.as_str(), "revoked_policy_id": "retention"}}),
        json!({"capsule_type": "POLICY_ASSERTION", "capsule_id": "retention",
               "policy": {"authority_basis": consent.as_str()}}),
        json!({"capsule_type": "CONSENT_REVOCATION"}),
    ];

    let mut failures = Vec::new();
    for (i, payload) in steps.into_iter().enumerate() {
        failures.extend(set.observe(&entry(i, payload)));
        if i == 1 {
            assert_eq!(set.snapshot().policy.active_policies, vec![hash(1).to_string()]);
        }
    }

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].code, FailureCode::AuthorityRevoked);
    assert_eq!(failures[0].step_index, Some(3));

    let snap = set.snapshot();
    assert_eq!(snap.capsule.total_count, 5);
    assert_eq!(snap.consent.state, ConsentState::Revoked);
    assert!(snap.consent.active_scopes.is_empty());
    assert_eq!(snap.policy.revoked_policies, vec!["retention".to_string()]);
    assert!(snap.policy.active_policies.is_empty());
}
