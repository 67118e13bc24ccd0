//! # Execution Adapters
//!
//! An adapter receives every successfully loaded capsule after the step's
//! governance checks. Its response is informational: the runner logs it
//! and never turns it into a failure. Adapters must not mutate capsules
//! and signal rejection with `accepted = false` rather than an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AdapterError;

/// Where in a run a capsule is being dispatched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterResponse {
    /// The adapter took the capsule. Says nothing about semantic success.
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl AdapterResponse {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            status: None,
            reason: None,
            meta: None,
        }
    }
}

#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn dispatch(
        &self,
        capsule: &Value,
        ctx: &DispatchContext,
    ) -> Result<AdapterResponse, AdapterError>;
}

/// Deterministic stand-in for a model backend. Performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAdapter;

#[async_trait]
impl ExecutionAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn dispatch(
        &self,
        _capsule: &Value,
        _ctx: &DispatchContext,
    ) -> Result<AdapterResponse, AdapterError> {
        Ok(AdapterResponse {
            status: Some("mock-ok".into()),
            meta: Some(json!({"tokens_in": 0, "tokens_out": 0})),
            ..AdapterResponse::accepted()
        })
    }
}

/// Accepts everything and reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdapter;

#[async_trait]
impl ExecutionAdapter for NoopAdapter {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn dispatch(
        &self,
        _capsule: &Value,
        _ctx: &DispatchContext,
    ) -> Result<AdapterResponse, AdapterError> {
        Ok(AdapterResponse::accepted())
    }
}
