//! # Harness Configuration
//!
//! Canonicalization, hashing and store settings for a run. Loadable from a
//! JSON or YAML file; every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! canonical:
//!   decimals: 6
//!   normalize_nfc: true
//! hash:
//!   algorithm: blake3
//!   digest_length: 16
//! store:
//!   root: ./capsules
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use capsule_core::canonical::MAX_DECIMALS;
use capsule_core::CanonicalizeOptions;
use capsule_crypto::HashOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::LocalStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root for relative capsule paths. Defaults to the working directory.
    pub root: Option<PathBuf>,
}

impl StoreConfig {
    /// Build the local store this config describes.
    pub fn local_store(&self) -> LocalStore {
        self.root
            .as_ref()
            .map(LocalStore::new)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub canonical: CanonicalizeOptions,
    pub hash: HashOptions,
    pub store: StoreConfig,
}

impl HarnessConfig {
    /// Load from `path`, parsing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: Self = if yaml {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        }
        .map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges serde cannot express. Hash options validate themselves
    /// on deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canonical.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "canonical.decimals must be at most {MAX_DECIMALS}, got {}",
                self.canonical.decimals
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_core::{DigestAlgorithm, DEFAULT_DECIMALS};

    #[test]
    fn test_defaults() {
        let c = HarnessConfig::default();
        assert_eq!(c.canonical.decimals, DEFAULT_DECIMALS);
        assert!(c.canonical.normalize_nfc);
        assert_eq!(c.hash.algorithm(), DigestAlgorithm::Blake3);
        assert_eq!(c.hash.digest_length(), 16);
        assert!(c.store.root.is_none());
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.yaml");
        fs::write(
            &path,
            "canonical:\n  decimals: 3\nhash:\n  algorithm: sha256\nstore:\n  root: /srv/capsules\n",
        )
        .unwrap();
        let c = HarnessConfig::load(&path).unwrap();
        assert_eq!(c.canonical.decimals, 3);
        assert!(c.canonical.normalize_nfc);
        assert_eq!(c.hash, HashOptions::sha256());
        assert_eq!(c.store.root, Some(PathBuf::from("/srv/capsules")));
    }

    #[test]
    fn test_load_empty_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(HarnessConfig::load(&path).unwrap(), HarnessConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        fs::write(&path, r#"{"canonical": {"decimals": 40}}"#).unwrap();
        assert!(matches!(
            HarnessConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, r#"{"hash": {"digest_length": 0}}"#).unwrap();
        assert!(matches!(
            HarnessConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = HarnessConfig::load(Path::new("/nonexistent/harness.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
