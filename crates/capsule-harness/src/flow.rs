//! # Flow Specifications
//!
//! A flow is an ordered list of steps, each pointing at one capsule file.
//! Parsing is split in two tiers: a document that is not a flow at all
//! (not an object, no `flow_id`, no `steps` array) is rejected as a whole,
//! while a single malformed step is kept as [`StepDecl::Malformed`] so the
//! runner can report it at its index and carry on.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowError;
use crate::store::CapsuleStore;

fn default_true() -> bool {
    true
}

/// One well-formed flow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    pub name: String,
    /// Absolute, or relative to the flow file's directory.
    pub capsule_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_capsule_type: Option<String>,
    #[serde(default = "default_true")]
    pub compute_hashes: bool,
    #[serde(default)]
    pub expect_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl FlowStep {
    pub fn new(name: impl Into<String>, capsule_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capsule_path: capsule_path.into(),
            expect_capsule_type: None,
            compute_hashes: true,
            expect_failure: false,
            failure_reason: None,
        }
    }
}

/// A step as declared in the flow file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDecl {
    Valid(FlowStep),
    /// The declaration could not be read as a step. `name` is kept when
    /// the declaration carried one.
    Malformed {
        name: Option<String>,
        reason: String,
    },
}

impl StepDecl {
    fn from_value(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        match FlowStep::deserialize(value) {
            Ok(step) if step.name.trim().is_empty() => StepDecl::Malformed {
                name: None,
                reason: "step name must not be empty".into(),
            },
            Ok(step) if step.capsule_path.trim().is_empty() => StepDecl::Malformed {
                name,
                reason: "capsule_path must not be empty".into(),
            },
            Ok(step) => StepDecl::Valid(step),
            Err(e) => StepDecl::Malformed {
                name,
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSpec {
    pub flow_id: String,
    pub description: Option<String>,
    pub steps: Vec<StepDecl>,
}

impl FlowSpec {
    /// Interpret a parsed flow document.
    pub fn from_value(doc: &Value) -> Result<Self, FlowError> {
        let obj = doc
            .as_object()
            .ok_or_else(|| FlowError::Invalid("flow document must be an object".into()))?;
        let flow_id = match obj.get("flow_id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(_) => {
                return Err(FlowError::Invalid(
                    "flow_id must be a non-empty string".into(),
                ))
            }
            None => return Err(FlowError::Invalid("missing flow_id".into())),
        };
        let steps = match obj.get("steps") {
            Some(Value::Array(steps)) => steps.iter().map(StepDecl::from_value).collect(),
            Some(_) => return Err(FlowError::Invalid("steps must be an array".into())),
            None => return Err(FlowError::Invalid("missing steps".into())),
        };
        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            flow_id,
            description,
            steps,
        })
    }

    /// Read and interpret the flow at `path`.
    pub fn load(store: &dyn CapsuleStore, path: &Path) -> Result<Self, FlowError> {
        let doc = store.get(path).map_err(|source| FlowError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_defaults() {
        let flow = FlowSpec::from_value(&json!({
            "flow_id": "f",
            "steps": [{"name": "one", "capsule_path": "a.json"}]
        }))
        .unwrap();
        assert_eq!(flow.steps, vec![StepDecl::Valid(FlowStep::new("one", "a.json"))]);
        assert!(flow.description.is_none());
    }

    #[test]
    fn test_all_step_fields() {
        let flow = FlowSpec::from_value(&json!({
            "flow_id": "f",
            "description": "demo",
            "steps": [{
                "name": "one",
                "capsule_path": "/abs/a.json",
                "expect_capsule_type": "MEMORY_COMMIT",
                "compute_hashes": false,
                "expect_failure": true,
                "failure_reason": "no consent"
            }]
        }))
        .unwrap();
        assert_eq!(flow.description.as_deref(), Some("demo"));
        let StepDecl::Valid(step) = &flow.steps[0] else {
            panic!("expected a valid step");
        };
        assert_eq!(step.expect_capsule_type.as_deref(), Some("MEMORY_COMMIT"));
        assert!(!step.compute_hashes);
        assert!(step.expect_failure);
        assert_eq!(step.failure_reason.as_deref(), Some("no consent"));
    }

    #[test]
    fn test_malformed_step_kept_in_place() {
        let flow = FlowSpec::from_value(&json!({
            "flow_id": "f",
            "steps": [
                {"name": "no-path"},
                "not an object",
                {"name": "ok", "capsule_path": "b.json"},
                {"name": "blank", "capsule_path": "  "}
            ]
        }))
        .unwrap();
        assert_eq!(flow.steps.len(), 4);
        assert!(matches!(
            &flow.steps[0],
            StepDecl::Malformed { name: Some(n), .. } if n == "no-path"
        ));
        assert!(matches!(&flow.steps[1], StepDecl::Malformed { name: None, .. }));
        assert!(matches!(&flow.steps[2], StepDecl::Valid(_)));
        assert!(matches!(&flow.steps[3], StepDecl::Malformed { .. }));
    }

    #[test]
    fn test_flow_shape_errors() {
        for doc in [
            json!([]),
            json!({"steps": []}),
            json!({"flow_id": "", "steps": []}),
            json!({"flow_id": 7, "steps": []}),
            json!({"flow_id": "f"}),
            json!({"flow_id": "f", "steps": {}}),
        ] {
            assert!(
                matches!(FlowSpec::from_value(&doc), Err(FlowError::Invalid(_))),
                "accepted {doc}"
            );
        }
    }
}
