//! # Trace Builder
//!
//! Turns one flow step into a [`TraceEntry`]: resolve the capsule path
//! through the store, load the document, check it is an object, read its type, then
//! canonicalize and hash it. Any failure along the way becomes a single
//! load-tier [`Failure`] for that step; it never aborts the run.

use std::path::{Path, PathBuf};

use capsule_core::{
    canonicalize, CanonicalizeOptions, CapsuleEvent, CapsuleHash, CapsuleMeta, CapsuleType,
    Failure, FailureCode, TraceEntry,
};
use capsule_crypto::{hash, HashOptions};
use serde_json::Value;

use crate::flow::FlowStep;
use crate::store::CapsuleStore;

/// A successfully loaded step: the trace entry plus the raw document,
/// which is what adapters receive.
#[derive(Debug, Clone)]
pub struct LoadedStep {
    pub entry: TraceEntry,
    pub capsule: Value,
}

/// Resolve a capsule path: absolute paths unchanged, relative ones
/// against `base_dir`.
pub fn resolve_capsule_path(base_dir: &Path, capsule_path: &str) -> PathBuf {
    let path = Path::new(capsule_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub struct TraceBuilder<'a> {
    store: &'a dyn CapsuleStore,
    canonical: CanonicalizeOptions,
    hash: HashOptions,
}

impl<'a> TraceBuilder<'a> {
    pub fn new(
        store: &'a dyn CapsuleStore,
        canonical: CanonicalizeOptions,
        hash: HashOptions,
    ) -> Self {
        Self {
            store,
            canonical,
            hash,
        }
    }

    /// Build the trace entry for `step`, or the one failure explaining why
    /// it could not be loaded.
    pub fn build(
        &self,
        step_index: usize,
        step: &FlowStep,
        base_dir: &Path,
    ) -> Result<LoadedStep, Failure> {
        let fail = |code, message: String| Failure::at_step(step_index, &step.name, code, message);

        let path = self
            .store
            .resolve(&resolve_capsule_path(base_dir, &step.capsule_path));
        let capsule = self.store.get(&path).map_err(|e| {
            fail(
                FailureCode::FileError,
                format!("failed to load {}: {e}", path.display()),
            )
        })?;
        if !capsule.is_object() {
            return Err(fail(
                FailureCode::InvalidCapsule,
                format!("capsule must be a JSON object, got {}", json_kind(&capsule)),
            ));
        }

        let capsule_type = CapsuleType::of(&capsule);
        let mut meta = CapsuleMeta {
            capsule_type: capsule_type.clone(),
            capsule_path: path.display().to_string(),
            canonical_json: None,
            hash_hex: None,
            capsule_hash: None,
        };

        let event = if step.compute_hashes {
            let canonical = canonicalize(&capsule, &self.canonical).map_err(|e| {
                fail(
                    FailureCode::InvalidCapsule,
                    format!("canonicalization failed: {e}"),
                )
            })?;
            // Governance rules read the normalized form, not the raw file.
            let normalized: Value = serde_json::from_str(canonical.as_str()).map_err(|e| {
                fail(
                    FailureCode::InvalidCapsule,
                    format!("canonical form does not reparse: {e}"),
                )
            })?;
            let digest = hash(&canonical, &self.hash);
            meta.hash_hex = Some(digest.to_hex());
            meta.capsule_hash = Some(CapsuleHash::from_digest(&digest));
            meta.canonical_json = Some(canonical.into_string());
            CapsuleEvent::decode(&capsule_type, &normalized)
        } else {
            CapsuleEvent::decode(&capsule_type, &Value::Null)
        };

        tracing::trace!(
            step_index,
            step_name = %step.name,
            capsule_type = %capsule_type,
            hashed = step.compute_hashes,
            "trace entry built"
        );

        Ok(LoadedStep {
            entry: TraceEntry {
                step_index,
                step_name: step.name.clone(),
                capsule: meta,
                event,
            },
            capsule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use capsule_core::DigestAlgorithm;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn build(dir: &Path, step: &FlowStep) -> Result<LoadedStep, Failure> {
        let store = LocalStore::new(dir);
        TraceBuilder::new(&store, CanonicalizeOptions::default(), HashOptions::default())
            .build(0, step, dir)
    }

    #[test]
    fn test_relative_path_against_base_dir() {
        assert_eq!(
            resolve_capsule_path(Path::new("/flows"), "capsules/a.json"),
            PathBuf::from("/flows/capsules/a.json")
        );
        assert_eq!(
            resolve_capsule_path(Path::new("/flows"), "/elsewhere/a.json"),
            PathBuf::from("/elsewhere/a.json")
        );
    }

    #[test]
    fn test_hashed_entry() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"z": 1.0000001, "capsule_type": "STATE"}"#);
        let loaded = build(dir.path(), &FlowStep::new("s", "a.json")).unwrap();
        let meta = &loaded.entry.capsule;
        assert_eq!(meta.capsule_type, CapsuleType::State);
        assert_eq!(
            meta.canonical_json.as_deref(),
            Some(r#"{"capsule_type":"STATE","z":1}"#)
        );
        let hex = meta.hash_hex.as_deref().unwrap();
        assert_eq!(hex.len(), 32);
        assert_eq!(
            meta.capsule_hash.as_ref().map(|h| h.to_string()),
            Some(format!("cap_{hex}"))
        );
        assert_eq!(
            meta.capsule_path,
            dir.path().join("a.json").display().to_string()
        );
        assert_eq!(loaded.capsule["z"], json!(1.0000001));
    }

    #[test]
    fn test_relative_base_dir_records_store_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("flows/capsules")).unwrap();
        write(&dir.path().join("flows/capsules"), "a.json", "{}");
        let store = LocalStore::new(dir.path());
        let loaded = TraceBuilder::new(&store, CanonicalizeOptions::default(), HashOptions::default())
            .build(0, &FlowStep::new("s", "capsules/a.json"), Path::new("flows"))
            .unwrap();
        assert_eq!(
            loaded.entry.capsule.capsule_path,
            dir.path().join("flows/capsules/a.json").display().to_string()
        );
    }

    #[test]
    fn test_hash_options_apply() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", "{}");
        let store = LocalStore::new(dir.path());
        let opts = HashOptions::new(DigestAlgorithm::Sha256, None).unwrap();
        let loaded = TraceBuilder::new(&store, CanonicalizeOptions::default(), opts)
            .build(0, &FlowStep::new("s", "a.json"), dir.path())
            .unwrap();
        assert_eq!(loaded.entry.capsule.hash_hex.unwrap().len(), 64);
    }

    #[test]
    fn test_missing_type_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"payload": true}"#);
        let loaded = build(dir.path(), &FlowStep::new("s", "a.json")).unwrap();
        assert_eq!(loaded.entry.capsule.capsule_type, CapsuleType::Unknown);
        assert_eq!(loaded.entry.event, CapsuleEvent::Unhandled(CapsuleType::Unknown));
    }

    #[test]
    fn test_unhashed_entry_keeps_type_and_path_only() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.json",
            r#"{"capsule_type": "CONSENT_ASSERTION", "consent": {"scope": ["memory_commit"]}}"#,
        );
        let mut step = FlowStep::new("s", "a.json");
        step.compute_hashes = false;
        let loaded = build(dir.path(), &step).unwrap();
        assert!(!loaded.entry.is_hashed());
        assert!(loaded.entry.capsule_hash().is_none());
        assert_eq!(loaded.entry.capsule.capsule_type, CapsuleType::ConsentAssertion);
        assert_eq!(
            loaded.entry.event,
            CapsuleEvent::ConsentAssertion { scope: Vec::new() }
        );
        let v = serde_json::to_value(&loaded.entry).unwrap();
        assert!(v["capsule"].get("canonical_json").is_none());
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{oops");
        for path in ["missing.json", "bad.json"] {
            let f = build(dir.path(), &FlowStep::new("s", path)).unwrap_err();
            assert_eq!(f.code, FailureCode::FileError);
            assert_eq!(f.step_index, Some(0));
            assert_eq!(f.step_name.as_deref(), Some("s"));
            assert!(f.message.contains(path), "{}", f.message);
        }
    }

    #[test]
    fn test_non_object_capsule() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", "[1, 2]");
        let f = build(dir.path(), &FlowStep::new("s", "a.json")).unwrap_err();
        assert_eq!(f.code, FailureCode::InvalidCapsule);
        assert!(f.message.contains("array"));
    }
}
