//! Injected event reporting for the orchestration layer.
//!
//! Dispatchers and the reconciler never log directly. They emit typed
//! [`OrchestrationEvent`]s into an [`EventSink`] handed to them at
//! construction, so callers choose where events go: [`TracingSink`] for
//! structured logs, [`RecordingSink`] to collect them (tests, UI progress),
//! [`NoopSink`] to drop them.
//!
//! # Thread Safety
//!
//! All methods take `&self`. One sink may be shared by concurrent
//! dispatches behind an `Arc`.

use serde::Serialize;
use std::sync::Mutex;

use crate::dispatch::outcome::{FallbackReason, PathTaken};

/// Which dispatcher produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Text,
    Audio,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Audio => "audio",
        })
    }
}

/// One state transition in a dispatch or reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestrationEvent {
    /// Input rejected before any network call.
    InputRejected { kind: CommandKind, reason: String },
    /// The availability probe answered.
    ProbeCompleted { ai_available: bool },
    /// The availability probe failed; treated as "AI unavailable".
    ProbeFailed { error: String },
    /// An AI interpretation attempt was started.
    AiAttemptStarted { kind: CommandKind, timeout_ms: u64 },
    /// The AI interpreter produced the result.
    AiSucceeded { kind: CommandKind },
    /// The AI attempt failed and the local interpreter takes over.
    FallbackTriggered { reason: FallbackReason, detail: String },
    /// The AI attempt failed and no fallback exists (audio).
    AiFailedWithoutFallback { reason: FallbackReason, detail: String },
    /// Audio was submitted while the AI interpreter is unavailable.
    AudioRejected,
    /// The local interpreter answered.
    LocalAttemptFinished { succeeded: bool },
    /// A dispatch reached a terminal state.
    DispatchFinished {
        kind: CommandKind,
        path: PathTaken,
        succeeded: bool,
    },
    /// The caller cancelled an in-flight operation.
    Cancelled { operation: String },
    /// One relation was created.
    RelationCreated { owner_id: u64, member_id: u64 },
    /// One relation could not be created.
    RelationFailed {
        owner_id: u64,
        member_id: u64,
        message: String,
    },
    /// Current relations could not be listed; replacement skips removal.
    RelationListingFailed { owner_id: u64, message: String },
    /// An existing relation could not be removed during replacement.
    RelationRemovalFailed { relation_id: u64, message: String },
    /// A batch of creations finished.
    ReconciliationFinished {
        owner_id: u64,
        success_count: usize,
        failure_count: usize,
    },
}

/// Receiver of orchestration events.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: &OrchestrationEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &OrchestrationEvent) {}
}

/// Sink that forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &OrchestrationEvent) {
        use OrchestrationEvent as E;
        match event {
            E::InputRejected { kind, reason } => {
                tracing::warn!(%kind, reason = %reason, "command rejected before dispatch");
            }
            E::ProbeCompleted { ai_available } => {
                tracing::debug!(ai_available, "AI availability probed");
            }
            E::ProbeFailed { error } => {
                tracing::warn!(error = %error, "AI availability probe failed, assuming unavailable");
            }
            E::AiAttemptStarted { kind, timeout_ms } => {
                tracing::info!(%kind, timeout_ms, "trying AI interpreter");
            }
            E::AiSucceeded { kind } => {
                tracing::info!(%kind, "AI interpreter succeeded");
            }
            E::FallbackTriggered { reason, detail } => {
                tracing::warn!(%reason, detail = %detail, "AI interpreter failed, falling back to local interpreter");
            }
            E::AiFailedWithoutFallback { reason, detail } => {
                tracing::warn!(%reason, detail = %detail, "AI interpreter failed, no fallback for audio");
            }
            E::AudioRejected => {
                tracing::warn!("AI unavailable, audio commands cannot be processed");
            }
            E::LocalAttemptFinished { succeeded } => {
                tracing::info!(succeeded, "local interpreter answered");
            }
            E::DispatchFinished {
                kind,
                path,
                succeeded,
            } => {
                tracing::info!(%kind, %path, succeeded, "dispatch finished");
            }
            E::Cancelled { operation } => {
                tracing::info!(operation = %operation, "operation cancelled by caller");
            }
            E::RelationCreated {
                owner_id,
                member_id,
            } => {
                tracing::debug!(owner_id, member_id, "relation created");
            }
            E::RelationFailed {
                owner_id,
                member_id,
                message,
            } => {
                tracing::warn!(owner_id, member_id, error = %message, "relation creation failed");
            }
            E::RelationListingFailed { owner_id, message } => {
                tracing::warn!(owner_id, error = %message, "could not list current relations, skipping removal");
            }
            E::RelationRemovalFailed {
                relation_id,
                message,
            } => {
                tracing::warn!(relation_id, error = %message, "relation removal failed");
            }
            E::ReconciliationFinished {
                owner_id,
                success_count,
                failure_count,
            } => {
                tracing::info!(
                    owner_id,
                    success_count,
                    failure_count,
                    "relation batch finished"
                );
            }
        }
    }
}

/// Sink that keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OrchestrationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<OrchestrationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if any recorded event satisfies `pred`.
    pub fn contains(&self, pred: impl Fn(&OrchestrationEvent) -> bool) -> bool {
        self.events().iter().any(pred)
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &OrchestrationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
