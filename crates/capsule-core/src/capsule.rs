//! # Capsules — Typed Views Over Governance Documents
//!
//! A capsule is a JSON object whose `capsule_type` field names the kind of
//! event it records. The harness never mutates capsule JSON; instead each
//! capsule is decoded once into a [`CapsuleEvent`], the small sum type that
//! observers and enforcement match on exhaustively.
//!
//! Field locations read by [`CapsuleEvent::decode`]:
//!
//! | Type                 | Fields                                                        |
//! |----------------------|---------------------------------------------------------------|
//! | `CONSENT_ASSERTION`  | `consent.scope` (array of strings, or a single string)        |
//! | `POLICY_ASSERTION`   | `capsule_id`, `policy.authority_basis`                        |
//! | `POLICY_REVOCATION`  | `revocation.authority_basis`, `revocation.revoked_policy_id`  |
//! | `MEMORY_*`           | `memory_id`, `actor` (top level or under the type's section)  |
//! | `MEMORY_COMMIT`      | additionally `commit.consent_reference`                       |
//!
//! Empty strings are treated the same as absent fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::CapsuleError;

/// The declared kind of a capsule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapsuleType {
    State,
    StanceDeclaration,
    ConsentAssertion,
    ConsentRevocation,
    PolicyAssertion,
    PolicyRevocation,
    MemoryRequest,
    MemoryCommit,
    MemoryReference,
    /// Substituted when a capsule declares no usable `capsule_type`.
    Unknown,
    /// Any other declared type, carried verbatim.
    Other(String),
}

impl CapsuleType {
    /// The wire label, e.g. `"CONSENT_ASSERTION"`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::State => "STATE",
            Self::StanceDeclaration => "STANCE_DECLARATION",
            Self::ConsentAssertion => "CONSENT_ASSERTION",
            Self::ConsentRevocation => "CONSENT_REVOCATION",
            Self::PolicyAssertion => "POLICY_ASSERTION",
            Self::PolicyRevocation => "POLICY_REVOCATION",
            Self::MemoryRequest => "MEMORY_REQUEST",
            Self::MemoryCommit => "MEMORY_COMMIT",
            Self::MemoryReference => "MEMORY_REFERENCE",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }

    /// Read the type a capsule declares, substituting `UNKNOWN` when the
    /// `capsule_type` field is absent, empty, or not a string.
    pub fn of(capsule: &Value) -> Self {
        match capsule.get("capsule_type").and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Self::from(s),
            _ => Self::Unknown,
        }
    }
}

impl From<&str> for CapsuleType {
    fn from(s: &str) -> Self {
        match s {
            "STATE" => Self::State,
            "STANCE_DECLARATION" => Self::StanceDeclaration,
            "CONSENT_ASSERTION" => Self::ConsentAssertion,
            "CONSENT_REVOCATION" => Self::ConsentRevocation,
            "POLICY_ASSERTION" => Self::PolicyAssertion,
            "POLICY_REVOCATION" => Self::PolicyRevocation,
            "MEMORY_REQUEST" => Self::MemoryRequest,
            "MEMORY_COMMIT" => Self::MemoryCommit,
            "MEMORY_REFERENCE" => Self::MemoryReference,
            "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for CapsuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CapsuleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CapsuleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Strict type extraction for tools outside the harness: `capsule_type` is
/// preferred, `type` is accepted as a fallback, both trimmed.
///
/// # Errors
///
/// `InvalidCapsule` if the value is not an object or neither field holds a
/// non-blank string.
pub fn extract_capsule_type(capsule: &Value) -> Result<String, CapsuleError> {
    let obj = capsule
        .as_object()
        .ok_or_else(|| CapsuleError::InvalidCapsule("capsule must be a JSON object".into()))?;

    ["capsule_type", "type"]
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CapsuleError::InvalidCapsule(
                "capsule missing required string field \"capsule_type\" (or fallback \"type\")"
                    .into(),
            )
        })
}

// ─── Events ──────────────────────────────────────────────────────────

/// Descriptive fields shared by memory capsules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub memory_id: Option<String>,
    pub actor: Option<String>,
}

/// The governance-relevant content of a capsule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapsuleEvent {
    ConsentAssertion {
        scope: Vec<String>,
    },
    ConsentRevocation,
    PolicyAssertion {
        policy_id: Option<String>,
        authority_basis: Option<String>,
    },
    PolicyRevocation {
        authority_basis: Option<String>,
        revoked_policy_id: Option<String>,
    },
    MemoryRequest(MemoryRecord),
    MemoryCommit {
        record: MemoryRecord,
        consent_reference: Option<String>,
    },
    MemoryReference(MemoryRecord),
    /// A type no observer acts on (including `STATE`, `STANCE_DECLARATION`,
    /// and unrecognized types).
    Unhandled(CapsuleType),
}

impl CapsuleEvent {
    /// Decode the event for `capsule_type` from a capsule payload.
    ///
    /// Pass `Value::Null` when the payload was not inspected; every field
    /// then decodes as absent.
    pub fn decode(capsule_type: &CapsuleType, payload: &Value) -> Self {
        match capsule_type {
            CapsuleType::ConsentAssertion => Self::ConsentAssertion {
                scope: scope_list(payload.pointer("/consent/scope")),
            },
            CapsuleType::ConsentRevocation => Self::ConsentRevocation,
            CapsuleType::PolicyAssertion => Self::PolicyAssertion {
                policy_id: text(payload, &["/capsule_id"]),
                authority_basis: text(payload, &["/policy/authority_basis"]),
            },
            CapsuleType::PolicyRevocation => Self::PolicyRevocation {
                authority_basis: text(payload, &["/revocation/authority_basis"]),
                revoked_policy_id: text(payload, &["/revocation/revoked_policy_id"]),
            },
            CapsuleType::MemoryRequest => Self::MemoryRequest(memory_record(payload, "request")),
            CapsuleType::MemoryCommit => Self::MemoryCommit {
                record: memory_record(payload, "commit"),
                consent_reference: text(payload, &["/commit/consent_reference"]),
            },
            CapsuleType::MemoryReference => {
                Self::MemoryReference(memory_record(payload, "reference"))
            }
            other => Self::Unhandled(other.clone()),
        }
    }
}

/// First non-empty string found at any of the JSON pointers.
fn text(payload: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| payload.pointer(p).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn scope_list(scope: Option<&Value>) -> Vec<String> {
    match scope {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn memory_record(payload: &Value, section: &str) -> MemoryRecord {
    let section_id = format!("/{section}/memory_id");
    let section_actor = format!("/{section}/actor");
    MemoryRecord {
        memory_id: text(payload, &["/memory_id", section_id.as_str(), "/memory/memory_id"]),
        actor: text(payload, &["/actor", section_actor.as_str(), "/memory/actor"]),
    }
}
