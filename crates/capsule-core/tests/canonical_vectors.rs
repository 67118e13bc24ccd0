//! # Canonical Form Vectors
//!
//! Fixed input/output pairs for the canonicalizer. Any change to these
//! outputs changes every capsule identifier computed downstream, so these
//! vectors act as a compatibility gate.

use capsule_core::{canonicalize, CanonicalBytes, CanonicalizeOptions};
use serde_json::{json, Value};

fn canon(v: &Value) -> String {
    canonicalize(v, &CanonicalizeOptions::default())
        .expect("canonicalization should succeed")
        .into_string()
}

#[test]
fn consent_capsule_vector() {
    let capsule = json!({
        "consent": {"scope": ["memory_commit", "read"], "granted_by": "user"},
        "capsule_type": "CONSENT_ASSERTION",
        "capsule_id": "consent-001"
    });
    assert_eq!(
        canon(&capsule),
        r#"{"capsule_id":"consent-001","capsule_type":"CONSENT_ASSERTION","consent":{"granted_by":"user","scope":["memory_commit","read"]}}"#
    );
}

#[test]
fn numeric_vector() {
    let doc = json!({
        "weights": [0.5, 1.0, 2.0000004, -0.0, 1e-9, 123456.1234567],
        "count": 3
    });
    assert_eq!(
        canon(&doc),
        r#"{"count":3,"weights":[0.5,1,2,0,0,123456.123457]}"#
    );
}

#[test]
fn whitespace_and_key_order_do_not_matter() {
    let a: Value = serde_json::from_str(r#"{ "b" : [1, 2], "a" : {"y": true, "x": null} }"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"a":{"x":null,"y":true},"b":[1,2]}"#).unwrap();
    assert_eq!(canon(&a), canon(&b));
}

#[test]
fn duplicate_keys_resolved_by_parser() {
    let v: Value = serde_json::from_str(r#"{"a": 1, "a": 2}"#).unwrap();
    assert_eq!(canon(&v), r#"{"a":2}"#);
}

#[test]
fn array_order_is_significant() {
    assert_ne!(canon(&json!([1, 2])), canon(&json!([2, 1])));
}

#[test]
fn unicode_is_written_raw() {
    assert_eq!(canon(&json!({"name": "Zoë ✓"})), "{\"name\":\"Zoë ✓\"}");
}

#[test]
fn typed_and_untyped_inputs_agree() {
    #[derive(serde::Serialize)]
    struct Commit<'a> {
        capsule_type: &'a str,
        weight: f64,
    }
    let typed = CanonicalBytes::new(&Commit {
        capsule_type: "MEMORY_COMMIT",
        weight: 0.25,
    })
    .unwrap();
    assert_eq!(
        typed.as_str(),
        canon(&json!({"weight": 0.25, "capsule_type": "MEMORY_COMMIT"}))
    );
}
