//! # capsule-core — Foundational Types for the Capsule Harness
//!
//! This crate is the leaf of the workspace. It defines the canonical byte
//! representation of capsules and the records that flow through a harness
//! run. Every other crate depends on `capsule-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest computation flows through
//!    [`canonicalize()`] or [`CanonicalBytes::new()`]. Hash functions accept
//!    nothing else, so two semantically identical capsules cannot hash
//!    differently.
//!
//! 2. **Typed capsule events.** Payload inspection happens once, in
//!    [`CapsuleEvent::decode()`]. Observers match on the sum type instead of
//!    reaching into raw JSON.
//!
//! 3. **Closed failure codes.** [`FailureCode`] is exhaustive; adding a code
//!    forces every consumer to handle it.
//!
//! 4. **UTC-only timestamps** with millisecond precision and a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `capsule-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod capsule;
pub mod digest;
pub mod error;
pub mod href;
pub mod identity;
pub mod temporal;
pub mod trace;

// Re-export primary types for ergonomic imports.
pub use canonical::{canonicalize, CanonicalBytes, CanonicalizeOptions, DEFAULT_DECIMALS};
pub use capsule::{extract_capsule_type, CapsuleEvent, CapsuleType, MemoryRecord};
pub use digest::{ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CapsuleError, CryptoError};
pub use href::HrefV1;
pub use identity::{CapsuleHash, PolicyHash};
pub use temporal::Timestamp;
pub use trace::{CapsuleMeta, Failure, FailureCode, TraceEntry};
