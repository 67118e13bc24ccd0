//! # capsule-crypto — Capsule Content Hashing
//!
//! Digest computation for the capsule harness:
//!
//! - **BLAKE3** (default), read from the extendable output to the configured
//!   length (16 bytes unless overridden).
//! - **SHA-256** fallback, always 32 bytes.
//! - Role-prefixed identifiers: `cap_<hex>` and `pc_<hex>`.
//!
//! Every function here takes `&CanonicalBytes`; there is no path that
//! hashes raw bytes.
//!
//! ## Crate Policy
//!
//! - Depends only on `capsule-core` internally.
//! - No mocking of hash functions in tests.

pub mod blake;
pub mod hasher;
pub mod sha256;

pub use blake::blake3_digest;
pub use hasher::{capsule_id, hash, policy_id, HashOptions};
pub use sha256::sha256_digest;
