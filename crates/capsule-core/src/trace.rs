//! # Trace Records and Failures
//!
//! A `TraceEntry` is created exactly once per successfully loaded flow step
//! and never mutated afterwards. The ordered list of entries is the only
//! input observers ever see.
//!
//! A `Failure` is the single reporting currency of a run. Failures are
//! accumulated in step order and never deduplicated.

use serde::{Deserialize, Serialize};

use crate::capsule::{CapsuleEvent, CapsuleType};
use crate::identity::CapsuleHash;

/// Closed set of failure codes, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    // Load tier.
    FlowLoadFailed,
    InvalidFlow,
    FileError,
    InvalidCapsule,
    UnexpectedCapsuleType,
    // Governance tier.
    MissingAuthority,
    AuthorityRevoked,
    InvalidAuthority,
    UnknownPolicy,
    MissingConsent,
    InvalidConsent,
    ScopeViolation,
    ExpectedFailureNotTriggered,
}

impl FailureCode {
    /// Wire label, e.g. `"SCOPE_VIOLATION"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlowLoadFailed => "FLOW_LOAD_FAILED",
            Self::InvalidFlow => "INVALID_FLOW",
            Self::FileError => "FILE_ERROR",
            Self::InvalidCapsule => "INVALID_CAPSULE",
            Self::UnexpectedCapsuleType => "UNEXPECTED_CAPSULE_TYPE",
            Self::MissingAuthority => "MISSING_AUTHORITY",
            Self::AuthorityRevoked => "AUTHORITY_REVOKED",
            Self::InvalidAuthority => "INVALID_AUTHORITY",
            Self::UnknownPolicy => "UNKNOWN_POLICY",
            Self::MissingConsent => "MISSING_CONSENT",
            Self::InvalidConsent => "INVALID_CONSENT",
            Self::ScopeViolation => "SCOPE_VIOLATION",
            Self::ExpectedFailureNotTriggered => "EXPECTED_FAILURE_NOT_TRIGGERED",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported problem. Flow-level failures carry no step coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub step_index: Option<usize>,
    pub step_name: Option<String>,
    pub code: FailureCode,
    pub message: String,
}

impl Failure {
    /// A failure attributed to a flow step.
    pub fn at_step(
        step_index: usize,
        step_name: impl Into<String>,
        code: FailureCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step_index: Some(step_index),
            step_name: Some(step_name.into()),
            code,
            message: message.into(),
        }
    }

    /// A failure of the flow as a whole.
    pub fn flow(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            step_index: None,
            step_name: None,
            code,
            message: message.into(),
        }
    }
}

/// Per-step capsule metadata recorded in the trace.
///
/// `canonical_json`, `hash_hex` and `capsule_hash` are absent when the step
/// disabled hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleMeta {
    pub capsule_type: CapsuleType,
    pub capsule_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capsule_hash: Option<CapsuleHash>,
}

/// One loaded flow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub step_index: usize,
    pub step_name: String,
    pub capsule: CapsuleMeta,
    /// Decoded governance content; not part of the serialized trace.
    #[serde(skip)]
    pub event: CapsuleEvent,
}

impl TraceEntry {
    /// Whether the payload was canonicalized and hashed for this step.
    /// Payload-driven rules only apply to hashed entries.
    pub fn is_hashed(&self) -> bool {
        self.capsule.canonical_json.is_some()
    }

    /// The capsule's content identifier, if hashed.
    pub fn capsule_hash(&self) -> Option<&CapsuleHash> {
        self.capsule.capsule_hash.as_ref()
    }

    /// Build a failure located at this entry's step.
    pub fn failure(&self, code: FailureCode, message: impl Into<String>) -> Failure {
        Failure::at_step(self.step_index, self.step_name.clone(), code, message)
    }
}
