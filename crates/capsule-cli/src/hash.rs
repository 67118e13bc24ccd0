//! # Hash Subcommand
//!
//! Canonicalizes a document, digests it and prints the digest record with
//! the role-prefixed identifier:
//!
//! ```json
//! {"hex": "…", "algorithm": "blake3", "digest_length": 16, "id": "cap_…"}
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use capsule_core::{canonicalize, CapsuleHash, DigestAlgorithm, PolicyHash};
use capsule_crypto::{hash, HashOptions};
use capsule_harness::HarnessConfig;

use crate::{print_json, read_document};

/// Which identifier prefix to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// `cap_<hex>`
    #[default]
    Capsule,
    /// `pc_<hex>`
    Policy,
}

/// Arguments for `capsule hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Document to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Digest algorithm (blake3 or sha256). Defaults to the configured one.
    #[arg(long)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Digest length in bytes (BLAKE3 only).
    #[arg(long)]
    pub length: Option<usize>,

    #[arg(long, value_enum, default_value_t = Role::Capsule)]
    pub role: Role,
}

pub fn run_hash(args: &HashArgs, config: &HarnessConfig) -> Result<u8> {
    print_json(&digest_record(args, config)?)?;
    Ok(0)
}

fn hash_options(args: &HashArgs, config: &HarnessConfig) -> Result<HashOptions> {
    if args.algorithm.is_none() && args.length.is_none() {
        return Ok(config.hash);
    }
    let algorithm = args.algorithm.unwrap_or_else(|| config.hash.algorithm());
    Ok(HashOptions::new(algorithm, args.length)?)
}

fn digest_record(args: &HashArgs, config: &HarnessConfig) -> Result<Value> {
    let opts = hash_options(args, config)?;
    let doc = read_document(&args.file)?;
    let canonical = canonicalize(&doc, &config.canonical)
        .with_context(|| format!("failed to canonicalize {}", args.file.display()))?;
    let digest = hash(&canonical, &opts);
    let id = match args.role {
        Role::Capsule => CapsuleHash::from_digest(&digest).to_string(),
        Role::Policy => PolicyHash::from_digest(&digest).to_string(),
    };
    tracing::debug!(algorithm = %opts.algorithm(), %id, "document hashed");

    let mut record = serde_json::to_value(&digest)?;
    record["id"] = json!(id);
    Ok(record)
}
