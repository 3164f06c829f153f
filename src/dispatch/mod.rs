//! Command dispatch with AI-first interpretation and bounded fallback.
//!
//! # Text commands
//!
//! ```text
//! Idle ──probe──► ai unavailable / force_local ──► LocalOnly ──► Done
//!   │
//!   └──probe──► ai available ──► TryAi ──success / domain error──► Done
//!                                  │
//!                                  └─provider error / timeout / transport──► Fallback ──► Done
//! ```
//!
//! # Audio commands
//!
//! ```text
//! Idle ──probe──► ai unavailable ──► Unavailable ──► Done (failure: "use text")
//!   │
//!   └──probe──► ai available ──► TryAi ──► Done
//! ```
//!
//! There is exactly one escalation step (AI → local) and no retries. The AI
//! call races a deadline on its own task; a losing task is aborted.

pub mod audio;
pub mod outcome;
pub(crate) mod race;
pub mod text;

use std::sync::Arc;
use std::time::Duration;

use commerce_gateway::{AudioClip, BackendGateway, CommandResponse, GatewayError};
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::observability::EventSink;
use self::race::RaceResult;

pub use audio::AudioDispatcher;
pub use outcome::{Command, DispatchOutcome, FallbackReason, PathTaken};
pub use text::CommandDispatcher;

/// Message returned for any dispatch the caller cancelled.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Per-call dispatch options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Overrides [`DispatchConfig::ai_timeout_ms`] for this call.
    pub timeout: Option<Duration>,
    /// Skip the AI interpreter. Text goes straight to the local
    /// interpreter; audio fails because it has no local interpreter.
    pub force_local: bool,
}

impl DispatchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn local_only(mut self) -> Self {
        self.force_local = true;
        self
    }
}

/// How a raced AI attempt ended, from the dispatcher's point of view.
pub(crate) enum AiVerdict {
    /// The AI interpreter produced a successful response.
    Succeeded(CommandResponse),
    /// The backend rejected the command for reasons unrelated to the AI
    /// provider. Retrying elsewhere would not help.
    DomainError(DispatchOutcome),
    /// The AI attempt is unusable; escalate (text) or give up (audio).
    Abandoned {
        reason: FallbackReason,
        detail: String,
    },
    Cancelled,
}

/// Classify the result of an AI attempt.
pub(crate) fn judge_ai_attempt(
    result: RaceResult<Result<CommandResponse, GatewayError>>,
    config: &DispatchConfig,
    timeout: Duration,
) -> AiVerdict {
    match result {
        RaceResult::Completed(Ok(response)) if response.success => AiVerdict::Succeeded(response),
        RaceResult::Completed(Ok(response)) => {
            let message = response.error.clone().unwrap_or_default();
            if config.is_provider_message(&message) {
                AiVerdict::Abandoned {
                    reason: FallbackReason::ProviderError,
                    detail: message,
                }
            } else {
                AiVerdict::DomainError(DispatchOutcome::from_response(response, PathTaken::Ai))
            }
        }
        RaceResult::Completed(Err(err)) => {
            if config.is_provider_message(err.message()) {
                AiVerdict::Abandoned {
                    reason: FallbackReason::ProviderError,
                    detail: err.message().to_owned(),
                }
            } else if err.is_outage() {
                AiVerdict::Abandoned {
                    reason: FallbackReason::Transport,
                    detail: err.to_string(),
                }
            } else {
                AiVerdict::DomainError(DispatchOutcome::failure(
                    err.message().to_owned(),
                    PathTaken::Ai,
                ))
            }
        }
        RaceResult::TimedOut => AiVerdict::Abandoned {
            reason: FallbackReason::Timeout,
            detail: format!("no answer within {}ms", timeout.as_millis()),
        },
        RaceResult::Aborted(detail) => AiVerdict::Abandoned {
            reason: FallbackReason::Aborted,
            detail,
        },
        RaceResult::Cancelled => AiVerdict::Cancelled,
    }
}

/// Routes a [`Command`] to the text or audio dispatcher.
pub struct Dispatcher {
    text: CommandDispatcher,
    audio: AudioDispatcher,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        sink: Arc<dyn EventSink>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            text: CommandDispatcher::new(Arc::clone(&gateway), Arc::clone(&sink), config.clone()),
            audio: AudioDispatcher::new(gateway, sink, config),
        }
    }

    /// Dispatch any command. Never fails; see [`DispatchOutcome`].
    pub async fn dispatch(
        &self,
        command: &Command,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        match command {
            Command::Text { content } => self.text.dispatch_with(content, options, cancel).await,
            Command::Audio { payload, filename } => {
                let clip = AudioClip::new(payload.clone(), filename.clone());
                self.audio.dispatch_with(clip, options, cancel).await
            }
        }
    }

    pub fn text(&self) -> &CommandDispatcher {
        &self.text
    }

    pub fn audio(&self) -> &AudioDispatcher {
        &self.audio
    }
}
