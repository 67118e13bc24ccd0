//! # Canon Subcommand
//!
//! Prints the canonical single-line form of a JSON or YAML document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use capsule_core::{canonicalize, CanonicalBytes};
use capsule_harness::HarnessConfig;

use crate::read_document;

/// Arguments for `capsule canon`.
#[derive(Args, Debug)]
pub struct CanonArgs {
    /// Document to canonicalize.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

pub fn run_canon(args: &CanonArgs, config: &HarnessConfig) -> Result<u8> {
    let canonical = canonical_form(args, config)?;
    println!("{canonical}");
    Ok(0)
}

fn canonical_form(args: &CanonArgs, config: &HarnessConfig) -> Result<CanonicalBytes> {
    let doc = read_document(&args.file)?;
    canonicalize(&doc, &config.canonical)
        .with_context(|| format!("failed to canonicalize {}", args.file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_of_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capsule.yaml");
        std::fs::write(&file, "z: 1.0000001\na: [b, c]\n").unwrap();
        let args = CanonArgs { file };
        let out = canonical_form(&args, &HarnessConfig::default()).unwrap();
        assert_eq!(out.as_str(), r#"{"a":["b","c"],"z":1}"#);
    }

    #[test]
    fn decimals_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("capsule.json");
        std::fs::write(&file, r#"{"x": 0.126}"#).unwrap();
        let mut config = HarnessConfig::default();
        config.canonical.decimals = 2;
        let out = canonical_form(&CanonArgs { file }, &config).unwrap();
        assert_eq!(out.as_str(), r#"{"x":0.13}"#);
    }
}
