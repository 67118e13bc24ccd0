//! # Run Subcommand
//!
//! Runs a flow file through the harness. Without `--out` the full result
//! document goes to stdout; with it the result is written to the file and
//! a short `{ok, flow_id, out}` summary is printed instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;

use capsule_harness::{
    CapsuleStore, HarnessConfig, LocalStore, MockAdapter, NoopAdapter, RunResult, Runner,
};

use crate::{print_json, EXIT_FAILURES};

/// Execution adapter to dispatch capsules to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdapterKind {
    /// Deterministic mock responses.
    Mock,
    /// Accept everything silently.
    Noop,
}

/// Arguments for `capsule run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Flow file (JSON or YAML).
    #[arg(value_name = "FLOW")]
    pub flow: PathBuf,

    /// Write the result document here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Dispatch every loaded capsule to an adapter. Structural-only when
    /// omitted.
    #[arg(long, value_enum)]
    pub adapter: Option<AdapterKind>,
}

/// Execute `capsule run` on a fresh single-threaded runtime.
pub fn run_run(args: &RunArgs, config: &HarnessConfig) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(execute(args, config));
    report(&result, args.out.as_deref())
}

/// Run the flow described by `args`.
pub async fn execute(args: &RunArgs, config: &HarnessConfig) -> RunResult {
    let runner = Runner::from_config(config);
    let runner = match args.adapter {
        Some(AdapterKind::Mock) => runner.with_adapter(MockAdapter),
        Some(AdapterKind::Noop) => runner.with_adapter(NoopAdapter),
        None => runner,
    };
    runner.run_flow(&args.flow).await
}

/// Emit the result and map it to an exit code.
pub fn report(result: &RunResult, out: Option<&Path>) -> Result<u8> {
    match out {
        Some(out) => {
            let doc = serde_json::to_value(result)?;
            LocalStore::default()
                .save(out, &doc)
                .with_context(|| format!("failed to write result: {}", out.display()))?;
            print_json(&json!({
                "ok": result.ok,
                "flow_id": result.flow_id,
                "out": out.display().to_string(),
            }))?;
        }
        None => print_json(result)?,
    }
    if result.ok {
        Ok(0)
    } else {
        tracing::warn!(failures = result.failures.len(), "run reported failures");
        Ok(EXIT_FAILURES)
    }
}
