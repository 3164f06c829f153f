//! commerce-admin: orchestration core of the commerce admin dashboard.
//!
//! Turns user commands into backend calls and backend results into
//! outcomes the dashboard can show:
//!
//! - **Probe**: asks the backend whether the AI interpreter is up
//! - **Dispatch**: text commands go AI first with one deterministic local
//!   fallback; audio commands go AI only
//! - **Reconcile**: creates or replaces many-to-many relations one call at a
//!   time and reports partial failures per item
//!
//! All network access goes through [`commerce_gateway::BackendGateway`], so
//! every component can run against a scripted gateway in tests.

pub mod admin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod observability;
pub mod probe;
pub mod reconcile;

#[cfg(test)]
mod test_utils;

pub use admin::AdminCore;
pub use config::{AdminConfig, DispatchConfig, ReconcileConfig};
pub use dispatch::{
    AudioDispatcher, Command, CommandDispatcher, DispatchOptions, DispatchOutcome, Dispatcher,
    FallbackReason, PathTaken,
};
pub use error::{AdminError, Result};
pub use observability::{EventSink, NoopSink, OrchestrationEvent, RecordingSink, TracingSink};
pub use probe::{ProbeReport, StatusProbe};
pub use reconcile::{ItemError, ReconciliationReport, RelationReconciler, ReplacementReport};
