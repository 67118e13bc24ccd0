//! # Capsule Hasher
//!
//! `hash(canonical, options) -> ContentDigest`, plus the role-prefixed
//! identifier wrappers. Options are validated once at construction so the
//! hash itself cannot fail.

use capsule_core::{
    CanonicalBytes, CapsuleHash, ContentDigest, CryptoError, DigestAlgorithm, PolicyHash,
};
use serde::{Deserialize, Serialize};

use crate::blake::{blake3_digest, BLAKE3_DEFAULT_LEN, BLAKE3_MAX_LEN};
use crate::sha256::{sha256_digest, SHA256_LEN};

/// Validated hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HashOptions {
    algorithm: DigestAlgorithm,
    digest_length: usize,
}

impl HashOptions {
    /// Build options for `algorithm`.
    ///
    /// BLAKE3 accepts lengths `1..=64` and defaults to 16. SHA-256 always
    /// produces 32 bytes; a requested length other than 32 is rejected.
    pub fn new(
        algorithm: DigestAlgorithm,
        digest_length: Option<usize>,
    ) -> Result<Self, CryptoError> {
        let digest_length = match algorithm {
            DigestAlgorithm::Blake3 => {
                let len = digest_length.unwrap_or(BLAKE3_DEFAULT_LEN);
                if len == 0 || len > BLAKE3_MAX_LEN {
                    return Err(CryptoError::InvalidDigestLength {
                        algorithm: algorithm.to_string(),
                        length: len,
                        reason: format!("must be between 1 and {BLAKE3_MAX_LEN} bytes"),
                    });
                }
                len
            }
            DigestAlgorithm::Sha256 => match digest_length {
                None | Some(SHA256_LEN) => SHA256_LEN,
                Some(len) => {
                    return Err(CryptoError::InvalidDigestLength {
                        algorithm: algorithm.to_string(),
                        length: len,
                        reason: format!("sha256 digests are always {SHA256_LEN} bytes"),
                    })
                }
            },
        };
        Ok(Self {
            algorithm,
            digest_length,
        })
    }

    /// SHA-256 with its fixed 32-byte length.
    pub fn sha256() -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            digest_length: SHA256_LEN,
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn digest_length(&self) -> usize {
        self.digest_length
    }
}

impl Default for HashOptions {
    /// BLAKE3, 16 bytes.
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::Blake3,
            digest_length: BLAKE3_DEFAULT_LEN,
        }
    }
}

impl<'de> Deserialize<'de> for HashOptions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            algorithm: DigestAlgorithm,
            digest_length: Option<usize>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.algorithm, raw.digest_length).map_err(serde::de::Error::custom)
    }
}

/// Hash canonical bytes under `opts`.
pub fn hash(data: &CanonicalBytes, opts: &HashOptions) -> ContentDigest {
    match opts.algorithm {
        DigestAlgorithm::Blake3 => blake3_digest(data, opts.digest_length),
        DigestAlgorithm::Sha256 => sha256_digest(data),
    }
}

/// Hash and render as a capsule identifier (`cap_<hex>`).
pub fn capsule_id(data: &CanonicalBytes, opts: &HashOptions) -> CapsuleHash {
    CapsuleHash::from_digest(&hash(data, opts))
}

/// Hash and render as a policy/consent-class identifier (`pc_<hex>`).
pub fn policy_id(data: &CanonicalBytes, opts: &HashOptions) -> PolicyHash {
    PolicyHash::from_digest(&hash(data, opts))
}
