//! Text command dispatcher: AI first, deterministic local interpreter as
//! the single fallback.

use std::sync::Arc;
use std::time::Duration;

use commerce_gateway::{BackendGateway, TextCommandRequest};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::race::race_deadline;
use super::{AiVerdict, CANCELLED_MESSAGE, DispatchOptions, judge_ai_attempt};
use super::outcome::{DispatchOutcome, FallbackReason, PathTaken};
use crate::config::DispatchConfig;
use crate::observability::{CommandKind, EventSink, OrchestrationEvent};
use crate::probe::StatusProbe;

/// States of one text dispatch run.
enum TextState {
    Idle,
    LocalOnly,
    TryAi,
    Fallback {
        reason: FallbackReason,
        detail: String,
    },
    Done(DispatchOutcome),
}

/// Dispatches typed commands. Holds no per-call state; concurrent calls are
/// independent.
pub struct CommandDispatcher {
    gateway: Arc<dyn BackendGateway>,
    probe: StatusProbe,
    sink: Arc<dyn EventSink>,
    config: DispatchConfig,
}

impl CommandDispatcher {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        sink: Arc<dyn EventSink>,
        config: DispatchConfig,
    ) -> Self {
        let probe = StatusProbe::new(
            Arc::clone(&gateway),
            Arc::clone(&sink),
            config.probe_timeout(),
        );
        Self {
            gateway,
            probe,
            sink,
            config,
        }
    }

    /// Dispatch with the configured deadline.
    pub async fn dispatch(&self, content: &str, cancel: &CancellationToken) -> DispatchOutcome {
        self.dispatch_with(content, &DispatchOptions::default(), cancel)
            .await
    }

    /// Dispatch a text command. Always produces an outcome.
    ///
    /// The local interpreter is called at most once, and only when the AI is
    /// unavailable, skipped, or its attempt was abandoned.
    pub async fn dispatch_with(
        &self,
        content: &str,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("dispatch.text", %request_id);
        self.run(content, options, cancel).instrument(span).await
    }

    async fn run(
        &self,
        content: &str,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        if content.trim().is_empty() {
            self.sink.emit(&OrchestrationEvent::InputRejected {
                kind: CommandKind::Text,
                reason: "empty command".to_owned(),
            });
            return self.finish(DispatchOutcome::failure(
                "error processing command: the command is empty",
                PathTaken::Local,
            ));
        }

        let timeout = options.timeout.unwrap_or_else(|| self.config.ai_timeout());
        let mut state = TextState::Idle;

        loop {
            state = match state {
                TextState::Idle => {
                    let probe = self.probe.probe(cancel).await;
                    if cancel.is_cancelled() {
                        TextState::Done(self.cancelled(PathTaken::Local))
                    } else if options.force_local || !probe.ai_available {
                        TextState::LocalOnly
                    } else {
                        TextState::TryAi
                    }
                }
                TextState::LocalOnly => TextState::Done(self.run_local(content, cancel).await),
                TextState::TryAi => self.try_ai(content, timeout, cancel).await,
                TextState::Fallback { reason, detail } => {
                    self.sink.emit(&OrchestrationEvent::FallbackTriggered { reason, detail });
                    let local = self.run_local(content, cancel).await;
                    let path_taken = if local.succeeded {
                        PathTaken::Local
                    } else {
                        PathTaken::AiOnlyFailed
                    };
                    TextState::Done(
                        DispatchOutcome {
                            path_taken,
                            ..local
                        }
                        .with_fallback_reason(reason),
                    )
                }
                TextState::Done(outcome) => return self.finish(outcome),
            };
        }
    }

    async fn try_ai(&self, content: &str, timeout: Duration, cancel: &CancellationToken) -> TextState {
        self.sink.emit(&OrchestrationEvent::AiAttemptStarted {
            kind: CommandKind::Text,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        });

        let gateway = Arc::clone(&self.gateway);
        let request = TextCommandRequest::ai(content);
        let result = race_deadline(
            async move { gateway.submit_text(&request).await },
            timeout,
            cancel,
        )
        .await;

        match judge_ai_attempt(result, &self.config, timeout) {
            AiVerdict::Succeeded(response) => {
                self.sink.emit(&OrchestrationEvent::AiSucceeded {
                    kind: CommandKind::Text,
                });
                TextState::Done(DispatchOutcome::from_response(response, PathTaken::Ai))
            }
            AiVerdict::DomainError(outcome) => TextState::Done(outcome),
            AiVerdict::Abandoned { reason, detail } => TextState::Fallback { reason, detail },
            AiVerdict::Cancelled => TextState::Done(self.cancelled(PathTaken::Ai)),
        }
    }

    async fn run_local(&self, content: &str, cancel: &CancellationToken) -> DispatchOutcome {
        let request = TextCommandRequest::local(content);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.cancelled(PathTaken::Local),
            result = self.gateway.submit_text(&request) => result,
        };

        match result {
            Ok(response) => {
                self.sink.emit(&OrchestrationEvent::LocalAttemptFinished {
                    succeeded: response.success,
                });
                DispatchOutcome::from_response(response, PathTaken::Local)
            }
            Err(err) => {
                self.sink.emit(&OrchestrationEvent::LocalAttemptFinished { succeeded: false });
                DispatchOutcome::failure(err.message().to_owned(), PathTaken::Local)
            }
        }
    }

    fn cancelled(&self, path_taken: PathTaken) -> DispatchOutcome {
        self.sink.emit(&OrchestrationEvent::Cancelled {
            operation: "text dispatch".to_owned(),
        });
        DispatchOutcome::failure(CANCELLED_MESSAGE, path_taken)
    }

    fn finish(&self, outcome: DispatchOutcome) -> DispatchOutcome {
        self.sink.emit(&OrchestrationEvent::DispatchFinished {
            kind: CommandKind::Text,
            path: outcome.path_taken,
            succeeded: outcome.succeeded,
        });
        outcome
    }
}
