//! # SHA-256 Digest Computation
//!
//! The full-length fallback algorithm. Like every digest path in the
//! workspace, it accepts only `CanonicalBytes`.

use capsule_core::{CanonicalBytes, ContentDigest, DigestAlgorithm};
use sha2::{Digest, Sha256};

/// Digest length of SHA-256 in bytes.
pub const SHA256_LEN: usize = 32;

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    ContentDigest::new(DigestAlgorithm::Sha256, hash.to_vec())
}
