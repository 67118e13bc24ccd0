//! # Schema Validation
//!
//! Runtime validation of capsule and flow documents against JSON Schema
//! definitions (Draft 2020-12).
//!
//! ## Schema Resolution
//!
//! Schemas are indexed by filename (e.g. `memory-commit.schema.json`) and
//! by their `$id`. A `$ref` to another schema resolves through a local
//! retriever that looks the URI up directly, then by its last path
//! segment. Unregistered references fail the validator build instead of
//! reaching the network.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use capsule_core::CapsuleType;
use jsonschema::{Retrieve, Uri, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Envelope schema every capsule must satisfy.
pub const ENVELOPE_SCHEMA: &str = "capsule.schema.json";

/// Schema for flow documents.
pub const FLOW_SCHEMA: &str = "flow.schema.json";

/// The schema that governs capsules of `capsule_type`. Types without a
/// dedicated schema fall back to the envelope.
pub fn schema_for_type(capsule_type: &CapsuleType) -> &'static str {
    match capsule_type {
        CapsuleType::ConsentAssertion => "consent-assertion.schema.json",
        CapsuleType::ConsentRevocation => "consent-revocation.schema.json",
        CapsuleType::PolicyAssertion => "policy-assertion.schema.json",
        CapsuleType::PolicyRevocation => "policy-revocation.schema.json",
        CapsuleType::MemoryCommit => "memory-commit.schema.json",
        _ => ENVELOPE_SCHEMA,
    }
}

struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas_by_uri
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("schema not registered: {uri_str}").into())
    }
}

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        schema_name: String,
        violations: ValidationViolations,
    },

    /// The schema could not be found or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError { schema_name: String, reason: String },

    /// The document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError { path: String, reason: String },

    /// The schema is not a valid schema, or a reference did not resolve.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError { schema_name: String, reason: String },

    /// IO error reading the schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaValidationError {
    /// The violations, when the error is a validation failure.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A registry of schemas that validates documents against them by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    schema_dir: Option<PathBuf>,
    /// Schema filename → parsed schema.
    schemas: HashMap<String, Value>,
}

impl SchemaValidator {
    /// Load every `*.schema.json` file in `schema_dir`.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let entries = std::fs::read_dir(&schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        let mut validator = Self {
            schema_dir: Some(schema_dir),
            schemas: HashMap::new(),
        };
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".schema.json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&content).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?;
            validator.schemas.insert(name.to_string(), value);
        }
        Ok(validator)
    }

    /// Register a schema under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) {
        self.schemas.insert(name.into(), schema);
    }

    /// A registry holding the single schema file at `path`, registered
    /// under its filename.
    pub fn from_file(path: &Path) -> Result<(Self, String), SchemaValidationError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SchemaValidationError::SchemaLoadError {
                schema_name: path.display().to_string(),
                reason: "path has no file name".into(),
            })?
            .to_string();
        let schema = load_document(path).map_err(|reason| SchemaValidationError::SchemaLoadError {
            schema_name: name.clone(),
            reason,
        })?;
        let mut validator = match path.parent() {
            Some(dir) if dir.is_dir() => Self::new(dir).unwrap_or_default(),
            _ => Self::default(),
        };
        validator.insert(name.clone(), schema);
        Ok((validator, name))
    }

    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Names of all loaded schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Every loaded schema, keyed by filename and by `$id`.
    fn retriever(&self) -> LocalSchemaRetriever {
        let mut schemas_by_uri = HashMap::new();
        for (filename, value) in &self.schemas {
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }
        LocalSchemaRetriever { schemas_by_uri }
    }

    /// Compile the named schema with every other schema available for
    /// `$ref` resolution.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaValidationError> {
        let schema = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: match &self.schema_dir {
                    Some(dir) => format!("schema not found in {}", dir.display()),
                    None => "schema not registered".into(),
                },
            }
        })?;
        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(self.retriever())
            .build(schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Validate `instance` against the named schema.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema_name)?;
        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Validate a capsule against the schema for its declared type, or
    /// the envelope when no type schema is loaded.
    pub fn validate_capsule(&self, capsule: &Value) -> Result<(), SchemaValidationError> {
        let typed = schema_for_type(&CapsuleType::of(capsule));
        let schema_name = if self.schemas.contains_key(typed) {
            typed
        } else {
            ENVELOPE_SCHEMA
        };
        self.validate_document(capsule, schema_name)
    }

    /// Load a JSON or YAML document (by extension) and validate it.
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let document =
            load_document(document_path).map_err(|reason| SchemaValidationError::DocumentLoadError {
                path: document_path.display().to_string(),
                reason,
            })?;
        self.validate_document(&document, schema_name)
    }
}

fn load_document(path: &Path) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))
        }
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}
