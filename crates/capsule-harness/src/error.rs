//! # Harness Errors
//!
//! Operational errors of the harness layer. None of these escape a run:
//! the runner turns each one into exactly one [`Failure`] carrying the
//! error's message. They surface directly only through the store, flow
//! and config APIs.
//!
//! [`Failure`]: capsule_core::Failure

use std::path::PathBuf;

use thiserror::Error;

/// Capsule store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No file at the resolved path.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but does not parse.
    #[error("invalid {format} in {}: {message}", .path.display())]
    Parse {
        /// `"JSON"` or `"YAML"`.
        format: &'static str,
        path: PathBuf,
        message: String,
    },

    /// A blob name that is not a single path component.
    #[error("invalid blob name {0:?}: must be a single path component")]
    InvalidBlobName(String),

    /// Serialization of a document to store failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flow file errors. The two variants map onto the two flow-level
/// failure codes.
#[derive(Error, Debug)]
pub enum FlowError {
    /// The flow file could not be read or parsed.
    #[error("failed to load flow {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// The flow document parsed but has the wrong shape.
    #[error("invalid flow: {0}")]
    Invalid(String),
}

/// Errors raised by an execution adapter. Logged, never reported as a
/// failure.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The backend could not be reached.
    #[error("adapter unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something unusable.
    #[error("adapter protocol error: {0}")]
    Protocol(String),
}

/// Harness configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file did not parse or failed field validation.
    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
