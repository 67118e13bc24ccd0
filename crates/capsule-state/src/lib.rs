//! # capsule-state — Governance Observers
//!
//! Four independent stateful reducers over the trace of a harness run.
//! Each consumes trace entries strictly in step order and exposes a
//! read-only snapshot. No observer reads another's state.
//!
//! ## Observers
//!
//! - **Capsule** (`capsule.rs`): counts by type and the ordered type list.
//!   Never fails.
//!
//! - **Consent** (`consent.rs`): `UNKNOWN → ASSERTED ⇄ REVOKED`, plus the
//!   scopes granted by each active consent capsule.
//!
//! - **Policy** (`policy.rs`): active consents usable as authority, active
//!   policies, and permanently revoked policy ids. Raises
//!   `MISSING_AUTHORITY`, `AUTHORITY_REVOKED`, `INVALID_AUTHORITY` and
//!   `UNKNOWN_POLICY`.
//!
//! - **Memory** (`memory.rs`): append-only request, commit and reference
//!   lists. Never fails.
//!
//! ## Design
//!
//! Observers match exhaustively on `CapsuleEvent`, so a new capsule kind
//! forces every observer to decide how to treat it. State lives in
//! per-run instances grouped by [`ObserverSet`].

pub mod capsule;
pub mod consent;
pub mod memory;
pub mod policy;
pub mod set;

use capsule_core::{Failure, TraceEntry};
use serde::Serialize;

pub use capsule::{CapsuleObserver, CapsuleSnapshot};
pub use consent::{ConsentObserver, ConsentSnapshot, ConsentState};
pub use memory::{MemoryEvent, MemoryObserver, MemorySnapshot};
pub use policy::{ActivePolicy, PolicyObserver, PolicySnapshot};
pub use set::{ObserverSet, ObserversSnapshot};

/// A stateful reducer over trace entries.
pub trait Observer {
    /// Read-only projection of the observer's state.
    type Snapshot: Serialize + Clone;

    /// Fold one entry into the state. Called once per loaded step, in
    /// step order.
    fn observe(&mut self, entry: &TraceEntry) -> Vec<Failure>;

    /// Idempotent and side-effect free.
    fn snapshot(&self) -> Self::Snapshot;
}
