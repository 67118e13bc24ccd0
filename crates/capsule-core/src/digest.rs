//! # Content Digest — Algorithm-Tagged Capsule Fingerprints
//!
//! Defines `ContentDigest` and `DigestAlgorithm`. A digest is always the hash
//! of `CanonicalBytes`; the functions that compute one live in
//! `capsule-crypto` and accept nothing else.
//!
//! On the wire a digest is `{hex, algorithm, digest_length}`.

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// BLAKE3 extendable output, truncated to the configured length.
    #[default]
    Blake3,
    /// SHA-256, always the full 32 bytes.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(CryptoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "DigestRecord", try_from = "DigestRecord")]
pub struct ContentDigest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl ContentDigest {
    /// Create a digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// The algorithm that produced this digest.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        self.bytes.len()
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from its lowercase hex rendering.
    pub fn from_hex(algorithm: DigestAlgorithm, hex: &str) -> Result<Self, CryptoError> {
        let bytes = decode_hex(hex).ok_or_else(|| CryptoError::InvalidDigestLength {
            algorithm: algorithm.to_string(),
            length: hex.len(),
            reason: "digest hex must be an even number of lowercase hex characters".into(),
        })?;
        Ok(Self::new(algorithm, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Wire shape of a digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DigestRecord {
    hex: String,
    algorithm: DigestAlgorithm,
    digest_length: usize,
}

impl From<ContentDigest> for DigestRecord {
    fn from(d: ContentDigest) -> Self {
        Self {
            hex: d.to_hex(),
            algorithm: d.algorithm,
            digest_length: d.bytes.len(),
        }
    }
}

impl TryFrom<DigestRecord> for ContentDigest {
    type Error = CryptoError;

    fn try_from(r: DigestRecord) -> Result<Self, Self::Error> {
        let digest = ContentDigest::from_hex(r.algorithm, &r.hex)?;
        if digest.digest_length() != r.digest_length {
            return Err(CryptoError::InvalidDigestLength {
                algorithm: r.algorithm.to_string(),
                length: r.digest_length,
                reason: format!("hex encodes {} bytes", digest.digest_length()),
            });
        }
        Ok(digest)
    }
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !is_lower_hex(hex) {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// True if `s` is non-empty and consists only of `0-9a-f`.
pub fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_algorithm_display() {
        assert_eq!(DigestAlgorithm::Blake3.to_string(), "blake3");
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Blake3);
    }

    #[test]
    fn test_digest_algorithm_from_str() {
        assert_eq!("BLAKE3".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Blake3);
        assert_eq!("sha-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert!(matches!(
            "md5".parse::<DigestAlgorithm>(),
            Err(CryptoError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_hex_is_lowercase() {
        let d = ContentDigest::new(DigestAlgorithm::Blake3, vec![0xAB, 0x01, 0xff]);
        assert_eq!(d.to_hex(), "ab01ff");
        assert_eq!(d.digest_length(), 3);
        assert_eq!(d.to_string(), "blake3:ab01ff");
    }

    #[test]
    fn test_wire_shape() {
        let d = ContentDigest::new(DigestAlgorithm::Sha256, vec![0x00, 0x10]);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"hex": "0010", "algorithm": "sha256", "digest_length": 2})
        );
        let back: ContentDigest = serde_json::from_value(v).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_wire_rejects_length_mismatch() {
        let v = serde_json::json!({"hex": "0010", "algorithm": "blake3", "digest_length": 16});
        assert!(serde_json::from_value::<ContentDigest>(v).is_err());
    }

    #[test]
    fn test_from_hex_rejects_uppercase_and_odd() {
        assert!(ContentDigest::from_hex(DigestAlgorithm::Blake3, "ABCD").is_err());
        assert!(ContentDigest::from_hex(DigestAlgorithm::Blake3, "abc").is_err());
        assert!(ContentDigest::from_hex(DigestAlgorithm::Blake3, "").is_err());
    }
}
