//! # Flow Runner
//!
//! Drives one flow end to end:
//!
//! ```text
//! LOAD FLOW → for each step: BUILD TRACE → OBSERVE → ENFORCE → DISPATCH → DONE
//! ```
//!
//! A flow that cannot be loaded yields a single flow-level failure and an
//! empty result. Otherwise every step is attempted; a step that fails to
//! load is reported and skipped, and later steps still run. Observers are
//! built fresh for each run, so a `Runner` can be reused and shared.
//!
//! The adapter dispatch is the only suspension point. It is awaited in
//! place, so step N+1 never starts before step N's dispatch resolves.

use std::path::Path;

use capsule_core::{CanonicalizeOptions, Failure, FailureCode, Timestamp, TraceEntry};
use capsule_crypto::HashOptions;
use capsule_state::{ObserverSet, ObserversSnapshot};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::adapter::{DispatchContext, ExecutionAdapter};
use crate::config::HarnessConfig;
use crate::enforcement::{apply_expectation, enforce};
use crate::error::FlowError;
use crate::flow::{FlowSpec, FlowStep, StepDecl};
use crate::store::{CapsuleStore, LocalStore};
use crate::trace::{LoadedStep, TraceBuilder};

/// Outcome of one run. `ok` iff `failures` is empty.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// `None` when the flow file could not be loaded.
    pub flow_id: Option<String>,
    pub ok: bool,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub failures: Vec<Failure>,
    pub trace: Vec<TraceEntry>,
    /// `None` when the flow file could not be loaded; serialized as `{}`.
    #[serde(serialize_with = "empty_when_none")]
    pub observers: Option<ObserversSnapshot>,
}

fn empty_when_none<S: Serializer>(
    observers: &Option<ObserversSnapshot>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match observers {
        Some(snapshot) => snapshot.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

impl RunResult {
    fn flow_failure(started_at: Timestamp, err: FlowError) -> Self {
        let code = match err {
            FlowError::Load { .. } => FailureCode::FlowLoadFailed,
            FlowError::Invalid(_) => FailureCode::InvalidFlow,
        };
        tracing::warn!(code = %code, error = %err, "flow rejected");
        Self {
            flow_id: None,
            ok: false,
            started_at,
            finished_at: Timestamp::now(),
            failures: vec![Failure::flow(code, err.to_string())],
            trace: Vec::new(),
            observers: None,
        }
    }

    /// Failures with the given code, in report order.
    pub fn failures_with(&self, code: FailureCode) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.code == code)
    }
}

pub struct Runner {
    store: Box<dyn CapsuleStore>,
    canonical: CanonicalizeOptions,
    hash: HashOptions,
    adapter: Option<Box<dyn ExecutionAdapter>>,
}

impl Runner {
    /// A structural-only runner over `store` with default options.
    pub fn new(store: impl CapsuleStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            canonical: CanonicalizeOptions::default(),
            hash: HashOptions::default(),
            adapter: None,
        }
    }

    /// A runner over the local store and options described by `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.store.local_store())
            .with_canonical_options(config.canonical)
            .with_hash_options(config.hash)
    }

    pub fn with_canonical_options(mut self, canonical: CanonicalizeOptions) -> Self {
        self.canonical = canonical;
        self
    }

    pub fn with_hash_options(mut self, hash: HashOptions) -> Self {
        self.hash = hash;
        self
    }

    /// Dispatch every loaded capsule to `adapter`.
    pub fn with_adapter(mut self, adapter: impl ExecutionAdapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    /// Load the flow at `path` and run it. Relative capsule paths resolve
    /// against the flow file's directory.
    pub async fn run_flow(&self, path: &Path) -> RunResult {
        let started_at = Timestamp::now();
        let flow = match FlowSpec::load(self.store.as_ref(), path) {
            Ok(flow) => flow,
            Err(e) => return RunResult::flow_failure(started_at, e),
        };
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        self.execute(&flow, base_dir, started_at).await
    }

    /// Run an already parsed flow, resolving relative capsule paths
    /// against `base_dir`.
    pub async fn run(&self, flow: &FlowSpec, base_dir: &Path) -> RunResult {
        self.execute(flow, base_dir, Timestamp::now()).await
    }

    async fn execute(&self, flow: &FlowSpec, base_dir: &Path, started_at: Timestamp) -> RunResult {
        let flow_id = flow.flow_id.as_str();
        tracing::info!(flow_id, steps = flow.steps.len(), "flow started");

        let builder = TraceBuilder::new(self.store.as_ref(), self.canonical, self.hash);
        let mut observers = ObserverSet::new();
        let mut trace = Vec::with_capacity(flow.steps.len());
        let mut failures = Vec::new();

        for (step_index, decl) in flow.steps.iter().enumerate() {
            let step = match decl {
                StepDecl::Valid(step) => step,
                StepDecl::Malformed { name, reason } => {
                    report(
                        &mut failures,
                        flow_id,
                        Failure {
                            step_index: Some(step_index),
                            step_name: name.clone(),
                            code: FailureCode::InvalidFlow,
                            message: format!("invalid step declaration: {reason}"),
                        },
                    );
                    continue;
                }
            };

            let LoadedStep { entry, capsule } = match builder.build(step_index, step, base_dir) {
                Ok(loaded) => loaded,
                Err(failure) => {
                    report(&mut failures, flow_id, failure);
                    continue;
                }
            };

            if let Some(failure) = check_expected_type(step_index, step, &entry) {
                report(&mut failures, flow_id, failure);
            }

            for failure in observers.observe(&entry) {
                report(&mut failures, flow_id, failure);
            }
            let violations = enforce(&entry, &observers.snapshot());
            for failure in apply_expectation(step_index, step, violations) {
                report(&mut failures, flow_id, failure);
            }

            self.dispatch(flow_id, step_index, &capsule).await;
            trace.push(entry);
        }

        let ok = failures.is_empty();
        tracing::info!(flow_id, ok, failures = failures.len(), "flow finished");
        RunResult {
            flow_id: Some(flow.flow_id.clone()),
            ok,
            started_at,
            finished_at: Timestamp::now(),
            failures,
            trace,
            observers: Some(observers.snapshot()),
        }
    }

    async fn dispatch(&self, flow_id: &str, step_index: usize, capsule: &Value) {
        let Some(adapter) = &self.adapter else {
            return;
        };
        let ctx = DispatchContext {
            flow_id: Some(flow_id.to_string()),
            step_index: Some(step_index),
        };
        match adapter.dispatch(capsule, &ctx).await {
            Ok(response) => tracing::debug!(
                flow_id,
                step_index,
                adapter = adapter.name(),
                accepted = response.accepted,
                status = response.status.as_deref().unwrap_or(""),
                "adapter response"
            ),
            Err(e) => tracing::warn!(
                flow_id,
                step_index,
                adapter = adapter.name(),
                error = %e,
                "adapter dispatch failed"
            ),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(LocalStore::default())
    }
}

fn check_expected_type(step_index: usize, step: &FlowStep, entry: &TraceEntry) -> Option<Failure> {
    let expected = step.expect_capsule_type.as_deref()?;
    let actual = entry.capsule.capsule_type.as_str();
    (expected != actual).then(|| {
        Failure::at_step(
            step_index,
            &step.name,
            FailureCode::UnexpectedCapsuleType,
            format!("expected capsule type {expected}, got {actual}"),
        )
    })
}

fn report(failures: &mut Vec<Failure>, flow_id: &str, failure: Failure) {
    tracing::info!(
        flow_id,
        step_index = failure.step_index,
        step_name = failure.step_name.as_deref(),
        code = %failure.code,
        "{}",
        failure.message
    );
    failures.push(failure);
}
