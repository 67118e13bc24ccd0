//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every crate in the workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Canonicalization errors are structural: they mark a capsule as
//!   unusable at load time, never as a governance violation.
//! - Hashing option errors are caught when the options are built, so the
//!   hash functions themselves are infallible.

use thiserror::Error;

/// Top-level error type for capsule handling.
#[derive(Error, Debug)]
pub enum CapsuleError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Hash configuration was rejected.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The document is valid JSON but not a capsule (e.g. not an object).
    #[error("invalid capsule: {0}")]
    InvalidCapsule(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// JSON parsing or serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanonicalizationError {
    /// NaN or an infinity was encountered.
    #[error("non-finite number is forbidden in canonical form: {0}")]
    NonFiniteNumber(f64),

    /// The value contains something that has no JSON representation
    /// (e.g. a map with non-string keys).
    #[error("unsupported type for canonicalization: {0}")]
    UnsupportedType(String),
}

/// Error in hashing configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The requested digest length is outside what the algorithm produces.
    #[error("invalid digest length {length} for {algorithm}: {reason}")]
    InvalidDigestLength {
        /// Algorithm name.
        algorithm: String,
        /// Requested length in bytes.
        length: usize,
        /// Why the length was rejected.
        reason: String,
    },

    /// The algorithm name is not recognized.
    #[error("unknown hash algorithm: {0:?}")]
    UnknownAlgorithm(String),
}
