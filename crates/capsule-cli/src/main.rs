//! # capsule CLI entry point
//!
//! Parses command-line arguments, sets up logging from the verbosity flag
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use capsule_cli::canon::{run_canon, CanonArgs};
use capsule_cli::hash::{run_hash, HashArgs};
use capsule_cli::href::{run_href, HrefArgs};
use capsule_cli::run::{run_run, RunArgs};
use capsule_cli::validate::{run_validate, ValidateArgs};
use capsule_cli::{load_config, GlobalOpts};

/// Capsule governance harness.
///
/// Replays flows of governance capsules, checks consent, policy authority
/// and memory-commit rules, and reports every failure with its step.
#[derive(Parser, Debug)]
#[command(name = "capsule", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a harness configuration file (JSON or YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Decimal places kept when canonicalizing numbers.
    #[arg(long, global = true)]
    decimals: Option<u32>,

    /// Disable NFC normalization of strings.
    #[arg(long, global = true)]
    no_nfc: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a flow and report failures, trace and observer state.
    Run(RunArgs),

    /// Print the canonical form of a document.
    Canon(CanonArgs),

    /// Print the digest and prefixed identifier of a document.
    Hash(HashArgs),

    /// Validate a capsule against a JSON Schema.
    Validate(ValidateArgs),

    /// Encode or parse HREF v1 reference lines.
    Href(HrefArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let globals = GlobalOpts {
        config: cli.config,
        decimals: cli.decimals,
        no_nfc: cli.no_nfc,
    };

    let result = load_config(&globals).and_then(|config| match &cli.command {
        Commands::Run(args) => run_run(args, &config),
        Commands::Canon(args) => run_canon(args, &config),
        Commands::Hash(args) => run_hash(args, &config),
        Commands::Validate(args) => run_validate(args),
        Commands::Href(args) => run_href(args),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
