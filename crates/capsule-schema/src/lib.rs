//! # capsule-schema — Capsule Schema Validation
//!
//! Structural contracts for capsule and flow documents, checked with JSON
//! Schema (Draft 2020-12). The harness itself never requires a capsule to
//! validate: a capsule that breaks its schema still runs and is judged by
//! the observers. Validation is a separate gate for tooling and authors.
//!
//! The repository's `schemas/` directory holds one envelope schema shared
//! by every capsule plus one schema per governed capsule type. Type
//! schemas reference the envelope by filename; references resolve locally
//! and never over the network.
//!
//! ## Crate Policy
//!
//! - Depends only on `capsule-core` internally.
//! - Violations carry the instance path, the schema path and a message.

pub mod validate;

pub use validate::{
    schema_for_type, SchemaValidationError, SchemaValidator, ValidationViolations, Violation,
    ENVELOPE_SCHEMA, FLOW_SCHEMA,
};
