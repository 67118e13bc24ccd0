//! # BLAKE3 Digest Computation
//!
//! The default capsule hash. BLAKE3's extendable output is read to the
//! requested length, so a 16-byte digest is the 16-byte prefix of the
//! standard 32-byte hash.

use blake3::Hasher;
use capsule_core::{CanonicalBytes, ContentDigest, DigestAlgorithm};

/// Default BLAKE3 digest length in bytes (32 hex characters).
pub const BLAKE3_DEFAULT_LEN: usize = 16;

/// Largest BLAKE3 digest length accepted by [`crate::HashOptions`].
pub const BLAKE3_MAX_LEN: usize = 64;

/// Compute a BLAKE3 digest of `len` bytes from canonical bytes.
///
/// Length validation happens in [`crate::HashOptions`]; this function
/// produces whatever length it is given.
pub fn blake3_digest(data: &CanonicalBytes, len: usize) -> ContentDigest {
    let mut hasher = Hasher::new();
    hasher.update(data.as_bytes());
    let mut out = vec![0u8; len];
    hasher.finalize_xof().fill(&mut out);
    ContentDigest::new(DigestAlgorithm::Blake3, out)
}
