//! # Policy Observer
//!
//! Tracks which consents may serve as authority and which policies are in
//! force. A policy id that has been revoked is terminal: it can never be
//! asserted again.
//!
//! ## Rules
//!
//! - `CONSENT_ASSERTION` adds the capsule hash to the active consents.
//! - `POLICY_ASSERTION` checks, in order: authority and policy id present
//!   (`MISSING_AUTHORITY`), id not previously revoked (`AUTHORITY_REVOKED`),
//!   authority is an active consent (`INVALID_AUTHORITY`).
//! - `POLICY_REVOCATION` checks, in order: authority and revoked id present
//!   (`MISSING_AUTHORITY`), authority is an active consent
//!   (`INVALID_AUTHORITY`), id is currently active (`UNKNOWN_POLICY`).
//!
//! Only hashed entries are evaluated; the rules read payload fields.

use std::collections::{BTreeMap, BTreeSet};

use capsule_core::{CapsuleEvent, CapsuleHash, Failure, FailureCode, TraceEntry};
use serde::{Deserialize, Serialize};

use crate::Observer;

/// An asserted policy currently in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePolicy {
    pub capsule_hash: CapsuleHash,
    pub authority_basis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Capsule hashes of active policies, ordered by policy id.
    pub active_policies: Vec<String>,
    /// Revoked policy ids in revocation order.
    pub revoked_policies: Vec<String>,
    /// Hashes of consents usable as authority.
    pub active_consents: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PolicyObserver {
    active_consents: BTreeSet<String>,
    active_policies: BTreeMap<String, ActivePolicy>,
    revoked_policies: Vec<String>,
}

impl PolicyObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active policy registered under `policy_id`.
    pub fn active_policy(&self, policy_id: &str) -> Option<&ActivePolicy> {
        self.active_policies.get(policy_id)
    }

    fn is_revoked(&self, policy_id: &str) -> bool {
        self.revoked_policies.iter().any(|p| p == policy_id)
    }

    fn assert_policy(
        &mut self,
        entry: &TraceEntry,
        policy_id: Option<&String>,
        authority_basis: Option<&String>,
    ) -> Option<Failure> {
        let Some(authority) = authority_basis else {
            return Some(entry.failure(
                FailureCode::MissingAuthority,
                "policy assertion requires delegated authority",
            ));
        };
        let Some(policy_id) = policy_id else {
            return Some(entry.failure(
                FailureCode::MissingAuthority,
                "policy assertion requires a capsule_id",
            ));
        };
        if self.is_revoked(policy_id) {
            return Some(entry.failure(
                FailureCode::AuthorityRevoked,
                format!("policy {policy_id} was revoked and cannot be re-asserted"),
            ));
        }
        if !self.active_consents.contains(authority) {
            return Some(entry.failure(
                FailureCode::InvalidAuthority,
                format!("authority {authority} does not match any active consent"),
            ));
        }

        // Entry is hashed here; see `observe`.
        let capsule_hash = entry.capsule_hash()?.clone();
        self.active_policies.insert(
            policy_id.clone(),
            ActivePolicy {
                capsule_hash,
                authority_basis: authority.clone(),
            },
        );
        tracing::debug!(step_index = entry.step_index, policy_id = %policy_id, "policy asserted");
        None
    }

    fn revoke_policy(
        &mut self,
        entry: &TraceEntry,
        authority_basis: Option<&String>,
        revoked_policy_id: Option<&String>,
    ) -> Option<Failure> {
        let (Some(authority), Some(policy_id)) = (authority_basis, revoked_policy_id) else {
            return Some(entry.failure(
                FailureCode::MissingAuthority,
                "policy revocation requires authority and policy id",
            ));
        };
        if !self.active_consents.contains(authority) {
            return Some(entry.failure(
                FailureCode::InvalidAuthority,
                format!("authority {authority} does not match any active consent"),
            ));
        }
        if self.active_policies.remove(policy_id).is_none() {
            return Some(entry.failure(
                FailureCode::UnknownPolicy,
                "cannot revoke unknown or inactive policy",
            ));
        }
        self.revoked_policies.push(policy_id.clone());
        tracing::debug!(step_index = entry.step_index, policy_id = %policy_id, "policy revoked");
        None
    }
}

impl Observer for PolicyObserver {
    type Snapshot = PolicySnapshot;

    fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure> {
        if !entry.is_hashed() {
            return Vec::new();
        }

        let failure = match &entry.event {
            CapsuleEvent::ConsentAssertion { .. } => {
                if let Some(hash) = entry.capsule_hash() {
                    self.active_consents.insert(hash.as_str().to_string());
                }
                None
            }
            CapsuleEvent::PolicyAssertion {
                policy_id,
                authority_basis,
            } => self.assert_policy(entry, policy_id.as_ref(), authority_basis.as_ref()),
            CapsuleEvent::PolicyRevocation {
                authority_basis,
                revoked_policy_id,
            } => self.revoke_policy(entry, authority_basis.as_ref(), revoked_policy_id.as_ref()),
            CapsuleEvent::ConsentRevocation
            | CapsuleEvent::MemoryRequest(_)
            | CapsuleEvent::MemoryCommit { .. }
            | CapsuleEvent::MemoryReference(_)
            | CapsuleEvent::Unhandled(_) => None,
        };

        failure.into_iter().collect()
    }

    fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            active_policies: self
                .active_policies
                .values()
                .map(|p| p.capsule_hash.as_str().to_string())
                .collect(),
            revoked_policies: self.revoked_policies.clone(),
            active_consents: self.active_consents.iter().cloned().collect(),
        }
    }
}
