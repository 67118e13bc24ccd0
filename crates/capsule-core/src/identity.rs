//! # Prefixed Identifiers
//!
//! Role-tagged renderings of a content digest. The prefix is cosmetic and
//! not part of the digest: `cap_<hex>` for capsules, `pc_<hex>` for
//! policy/consent-class hashes. Distinct newtypes keep the two roles from
//! being passed for one another.

use serde::{Deserialize, Serialize};

use crate::digest::{is_lower_hex, ContentDigest};

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Identifier prefix for this role.
            pub const PREFIX: &'static str = $prefix;

            /// Render a digest under this role.
            pub fn from_digest(digest: &ContentDigest) -> Self {
                Self(format!("{}{}", Self::PREFIX, digest.to_hex()))
            }

            /// Accept an existing identifier string if it carries this role's
            /// prefix followed by lowercase hex.
            pub fn parse(s: &str) -> Option<Self> {
                let hex = s.strip_prefix(Self::PREFIX)?;
                is_lower_hex(hex).then(|| Self(s.to_string()))
            }

            /// The full prefixed identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The hex digest without the prefix.
            pub fn hex(&self) -> &str {
                &self.0[Self::PREFIX.len()..]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

prefixed_id!(
    /// Identifier of a capsule: `cap_<hex>`.
    CapsuleHash,
    "cap_"
);

prefixed_id!(
    /// Identifier of a policy or consent class: `pc_<hex>`.
    PolicyHash,
    "pc_"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DigestAlgorithm;

    fn digest() -> ContentDigest {
        ContentDigest::new(DigestAlgorithm::Blake3, vec![0xde, 0xad, 0xbe, 0xef])
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(CapsuleHash::from_digest(&digest()).as_str(), "cap_deadbeef");
        assert_eq!(PolicyHash::from_digest(&digest()).as_str(), "pc_deadbeef");
    }

    #[test]
    fn test_hex_strips_prefix() {
        assert_eq!(CapsuleHash::from_digest(&digest()).hex(), "deadbeef");
    }

    #[test]
    fn test_parse() {
        assert!(CapsuleHash::parse("cap_deadbeef").is_some());
        assert!(CapsuleHash::parse("pc_deadbeef").is_none());
        assert!(CapsuleHash::parse("cap_").is_none());
        assert!(CapsuleHash::parse("cap_DEADBEEF").is_none());
        assert!(PolicyHash::parse("pc_00").is_some());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = CapsuleHash::from_digest(&digest());
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("cap_deadbeef"));
    }
}
