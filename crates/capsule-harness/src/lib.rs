//! # capsule-harness — Flow Runner
//!
//! Executes flow files against the canonicalizer, hasher and observers of
//! the lower crates and produces a [`RunResult`].
//!
//! ## Modules
//!
//! - **Store** (`store.rs`): the [`CapsuleStore`] interface and the
//!   filesystem-backed [`LocalStore`].
//! - **Flow** (`flow.rs`): flow document parsing, JSON or YAML.
//! - **Trace** (`trace.rs`): builds one [`TraceEntry`] per loadable step.
//! - **Enforcement** (`enforcement.rs`): the memory-commit consent gate and
//!   the `expect_failure` inversion of enforcement violations.
//! - **Adapter** (`adapter.rs`): the async [`ExecutionAdapter`] seam with
//!   mock and no-op implementations.
//! - **Runner** (`runner.rs`): the step loop.
//! - **Config** (`config.rs`): [`HarnessConfig`].
//!
//! ## Crate Policy
//!
//! - Operational errors never escape a run; each becomes one `Failure`.
//! - No global state. Every run builds its own observers.
//!
//! [`TraceEntry`]: capsule_core::TraceEntry

pub mod adapter;
pub mod config;
pub mod enforcement;
pub mod error;
pub mod flow;
pub mod runner;
pub mod store;
pub mod trace;

pub use adapter::{AdapterResponse, DispatchContext, ExecutionAdapter, MockAdapter, NoopAdapter};
pub use config::{HarnessConfig, StoreConfig};
pub use enforcement::{apply_expectation, enforce, MEMORY_COMMIT_SCOPE};
pub use error::{AdapterError, ConfigError, FlowError, StoreError};
pub use flow::{FlowSpec, FlowStep, StepDecl};
pub use runner::{RunResult, Runner};
pub use store::{CapsuleStore, LocalStore};
pub use trace::{LoadedStep, TraceBuilder};
