//! # Semantic Enforcement
//!
//! Cross-observer checks evaluated after every observer has folded a step.
//! The only rule today gates `MEMORY_COMMIT` on an active consent that
//! grants the `memory_commit` scope.
//!
//! [`apply_expectation`] then reconciles the step's violations with
//! its `expect_failure` flag.

use capsule_core::{CapsuleEvent, Failure, FailureCode, TraceEntry};
use capsule_state::ObserversSnapshot;

use crate::flow::FlowStep;

/// Scope a consent must grant before memory may be committed under it.
pub const MEMORY_COMMIT_SCOPE: &str = "memory_commit";

/// Default message when an `expect_failure` step passes cleanly.
pub const EXPECTED_FAILURE_MESSAGE: &str = "Expected failure did not occur";

/// Evaluate enforcement rules for `entry` against the post-step snapshot.
pub fn enforce(entry: &TraceEntry, snapshot: &ObserversSnapshot) -> Vec<Failure> {
    if !entry.is_hashed() {
        return Vec::new();
    }
    let violation = |code, message: &str| {
        vec![Failure::at_step(
            entry.step_index,
            &entry.step_name,
            code,
            message,
        )]
    };
    match &entry.event {
        CapsuleEvent::MemoryCommit {
            consent_reference, ..
        } => {
            let Some(reference) = consent_reference else {
                return violation(
                    FailureCode::MissingConsent,
                    "memory commit requires active consent",
                );
            };
            match snapshot.consent.scopes_for(reference) {
                None => violation(
                    FailureCode::InvalidConsent,
                    "referenced consent is not active",
                ),
                Some(scopes) if !scopes.iter().any(|s| s == MEMORY_COMMIT_SCOPE) => violation(
                    FailureCode::ScopeViolation,
                    "active consent does not grant memory_commit scope",
                ),
                Some(_) => Vec::new(),
            }
        }
        CapsuleEvent::ConsentAssertion { .. }
        | CapsuleEvent::ConsentRevocation
        | CapsuleEvent::PolicyAssertion { .. }
        | CapsuleEvent::PolicyRevocation { .. }
        | CapsuleEvent::MemoryRequest(_)
        | CapsuleEvent::MemoryReference(_)
        | CapsuleEvent::Unhandled(_) => Vec::new(),
    }
}

/// Reconcile a step's enforcement violations with its expectation.
///
/// `violations` must be the output of [`enforce`] for the step. Observer
/// failures are reported as they are and never pass through here. Without
/// `expect_failure` the violations pass through. With it, any violation
/// counts as the expected one and is dropped, and a step without one
/// yields `EXPECTED_FAILURE_NOT_TRIGGERED`.
pub fn apply_expectation(
    step_index: usize,
    step: &FlowStep,
    violations: Vec<Failure>,
) -> Vec<Failure> {
    if !step.expect_failure {
        return violations;
    }
    if violations.is_empty() {
        let message = step
            .failure_reason
            .as_deref()
            .unwrap_or(EXPECTED_FAILURE_MESSAGE);
        return vec![Failure::at_step(
            step_index,
            &step.name,
            FailureCode::ExpectedFailureNotTriggered,
            message,
        )];
    }
    tracing::debug!(
        step_index,
        step_name = %step.name,
        count = violations.len(),
        "expected violation observed"
    );
    Vec::new()
}
