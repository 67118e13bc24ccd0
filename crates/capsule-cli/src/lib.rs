//! # capsule-cli — Capsule Harness Command-Line Interface
//!
//! Provides the `capsule` binary.
//!
//! ## Subcommands
//!
//! - `capsule run`: Run a flow and print or write the result.
//! - `capsule canon`: Print the canonical form of a document.
//! - `capsule hash`: Digest a document and print its prefixed identifier.
//! - `capsule validate`: Validate a capsule against a JSON Schema.
//! - `capsule href`: Encode or parse HREF v1 lines.
//!
//! ```bash
//! capsule run flows/consent_then_commit.json --out results/run.json
//! capsule -v hash capsules/consent.json --algorithm sha256
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `2` the run or validation reported failures, `1` an
//! operational error (unreadable input, bad configuration).
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the library crates and hold no governance logic.

pub mod canon;
pub mod hash;
pub mod href;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capsule_harness::store::parse_document;
use capsule_harness::HarnessConfig;
use serde_json::Value;

/// Exit code for a run or validation that reported failures.
pub const EXIT_FAILURES: u8 = 2;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub decimals: Option<u32>,
    pub no_nfc: bool,
}

/// Load the harness config from `--config` (or defaults) and apply flag
/// overrides.
pub fn load_config(opts: &GlobalOpts) -> Result<HarnessConfig> {
    let mut config = match &opts.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(decimals) = opts.decimals {
        config.canonical.decimals = decimals;
    }
    if opts.no_nfc {
        config.canonical.normalize_nfc = false;
    }
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Read a JSON or YAML document (by extension).
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    parse_document(path, &text)
        .with_context(|| format!("failed to parse document: {}", path.display()))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_apply() {
        let config = load_config(&GlobalOpts {
            config: None,
            decimals: Some(2),
            no_nfc: true,
        })
        .unwrap();
        assert_eq!(config.canonical.decimals, 2);
        assert!(!config.canonical.normalize_nfc);
    }

    #[test]
    fn flag_overrides_are_validated() {
        let err = load_config(&GlobalOpts {
            decimals: Some(99),
            ..GlobalOpts::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("decimals"));
    }

    #[test]
    fn config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.yaml");
        std::fs::write(&path, "hash:\n  algorithm: sha256\n").unwrap();
        let config = load_config(&GlobalOpts {
            config: Some(path),
            ..GlobalOpts::default()
        })
        .unwrap();
        assert_eq!(config.hash.digest_length(), 32);
    }

    #[test]
    fn read_document_errors_name_the_file() {
        let err = read_document(Path::new("/nonexistent/capsule.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/capsule.json"));
    }
}
