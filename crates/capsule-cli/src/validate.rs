//! # Validate Subcommand
//!
//! Validates a capsule document against a JSON Schema file. Sibling
//! `*.schema.json` files in the schema's directory are available for
//! `$ref` resolution.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use capsule_schema::{SchemaValidationError, SchemaValidator};

use crate::{print_json, EXIT_FAILURES};

/// Arguments for `capsule validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON Schema file.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Capsule document (JSON or YAML).
    #[arg(value_name = "CAPSULE")]
    pub capsule: PathBuf,
}

pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let (validator, schema_name) = SchemaValidator::from_file(&args.schema)?;
    match validator.validate_file(&args.capsule, &schema_name) {
        Ok(()) => {
            print_json(&json!({"ok": true, "schema": schema_name}))?;
            Ok(0)
        }
        Err(SchemaValidationError::ValidationFailed { violations, .. }) => {
            tracing::info!(count = violations.len(), "capsule failed validation");
            print_json(&json!({
                "ok": false,
                "schema": schema_name,
                "violations": violations,
            }))?;
            Ok(EXIT_FAILURES)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup(capsule: &str) -> (tempfile::TempDir, ValidateArgs) {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("state.schema.json");
        fs::write(
            &schema,
            r#"{"type": "object", "required": ["capsule_type"],
                "properties": {"capsule_type": {"const": "STATE"}}}"#,
        )
        .unwrap();
        let file = dir.path().join("capsule.json");
        fs::write(&file, capsule).unwrap();
        let args = ValidateArgs {
            schema,
            capsule: file,
        };
        (dir, args)
    }

    #[test]
    fn valid_capsule_exits_zero() {
        let (_dir, args) = setup(r#"{"capsule_type": "STATE"}"#);
        assert_eq!(run_validate(&args).unwrap(), 0);
    }

    #[test]
    fn invalid_capsule_exits_two() {
        let (_dir, args) = setup(r#"{"capsule_type": "MEMORY_COMMIT"}"#);
        assert_eq!(run_validate(&args).unwrap(), EXIT_FAILURES);
    }

    #[test]
    fn unreadable_capsule_is_an_error() {
        let (_dir, mut args) = setup("{}");
        args.capsule = PathBuf::from("/nonexistent/capsule.json");
        assert!(run_validate(&args).is_err());
    }
}
