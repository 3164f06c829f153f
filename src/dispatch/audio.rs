//! Audio command dispatcher. Audio has no local interpreter, so every AI
//! failure is terminal and the caller is told to resend the command as text.

use std::sync::Arc;
use std::time::Duration;

use commerce_gateway::{AudioClip, BackendGateway};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::outcome::{DispatchOutcome, PathTaken};
use super::race::race_deadline;
use super::{AiVerdict, CANCELLED_MESSAGE, DispatchOptions, judge_ai_attempt};
use crate::config::DispatchConfig;
use crate::observability::{CommandKind, EventSink, OrchestrationEvent};
use crate::probe::StatusProbe;

/// Returned when the probe says the AI interpreter is down.
pub const AI_UNAVAILABLE_MESSAGE: &str =
    "the AI interpreter is not available to process audio; send the command as text instead";

/// Returned when the AI attempt was abandoned (provider error, timeout, outage).
pub const AI_FAILED_MESSAGE: &str =
    "the audio could not be processed because the AI interpreter failed; send the command as text instead";

/// Returned when the caller asked to skip the AI interpreter for audio.
pub const NO_LOCAL_AUDIO_MESSAGE: &str =
    "audio cannot be processed without the AI interpreter; send the command as text instead";

enum AudioState {
    Idle(AudioClip),
    Unavailable,
    TryAi(AudioClip),
    Done(DispatchOutcome),
}

/// Dispatches recorded voice commands.
pub struct AudioDispatcher {
    gateway: Arc<dyn BackendGateway>,
    probe: StatusProbe,
    sink: Arc<dyn EventSink>,
    config: DispatchConfig,
}

impl AudioDispatcher {
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
    pub async fn dispatch(&self, clip: AudioClip, cancel: &CancellationToken) -> DispatchOutcome {
        self.dispatch_with(clip, &DispatchOptions::default(), cancel)
            .await
    }

    /// Dispatch a voice command. An empty filename is replaced with
    /// [`DispatchConfig::audio_filename`].
    pub async fn dispatch_with(
        &self,
        clip: AudioClip,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("dispatch.audio", %request_id, bytes = clip.payload.len());
        self.run(clip, options, cancel).instrument(span).await
    }

    async fn run(
        &self,
        mut clip: AudioClip,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        if clip.payload.is_empty() {
            self.sink.emit(&OrchestrationEvent::InputRejected {
                kind: CommandKind::Audio,
                reason: "empty recording".to_owned(),
            });
            return self.finish(DispatchOutcome::failure(
                "the recording is empty; record the command again or send it as text",
                PathTaken::AiOnlyFailed,
            ));
        }
        if clip.filename.trim().is_empty() {
            clip.filename.clone_from(&self.config.audio_filename);
        }

        let timeout = options.timeout.unwrap_or_else(|| self.config.ai_timeout());
        let mut state = AudioState::Idle(clip);

        loop {
            state = match state {
                AudioState::Idle(clip) => {
                    if options.force_local {
                        AudioState::Done(DispatchOutcome::failure(
                            NO_LOCAL_AUDIO_MESSAGE,
                            PathTaken::AiOnlyFailed,
                        ))
                    } else {
                        let probe = self.probe.probe(cancel).await;
                        if cancel.is_cancelled() {
                            AudioState::Done(self.cancelled())
                        } else if probe.ai_available {
                            AudioState::TryAi(clip)
                        } else {
                            AudioState::Unavailable
                        }
                    }
                }
                AudioState::Unavailable => {
                    self.sink.emit(&OrchestrationEvent::AudioRejected);
                    AudioState::Done(DispatchOutcome::failure(
                        AI_UNAVAILABLE_MESSAGE,
                        PathTaken::AiOnlyFailed,
                    ))
                }
                AudioState::TryAi(clip) => self.try_ai(clip, timeout, cancel).await,
                AudioState::Done(outcome) => return self.finish(outcome),
            };
        }
    }

    async fn try_ai(&self, clip: AudioClip, timeout: Duration, cancel: &CancellationToken) -> AudioState {
        self.sink.emit(&OrchestrationEvent::AiAttemptStarted {
            kind: CommandKind::Audio,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        });

        let gateway = Arc::clone(&self.gateway);
        let result = race_deadline(
            async move { gateway.submit_audio(&clip).await },
            timeout,
            cancel,
        )
        .await;

        match judge_ai_attempt(result, &self.config, timeout) {
            AiVerdict::Succeeded(response) => {
                self.sink.emit(&OrchestrationEvent::AiSucceeded {
                    kind: CommandKind::Audio,
                });
                AudioState::Done(DispatchOutcome::from_response(response, PathTaken::Ai))
            }
            AiVerdict::DomainError(outcome) => AudioState::Done(outcome),
            AiVerdict::Abandoned { reason, detail } => {
                self.sink
                    .emit(&OrchestrationEvent::AiFailedWithoutFallback { reason, detail });
                AudioState::Done(
                    DispatchOutcome::failure(AI_FAILED_MESSAGE, PathTaken::AiOnlyFailed)
                        .with_fallback_reason(reason),
                )
            }
            AiVerdict::Cancelled => AudioState::Done(self.cancelled()),
        }
    }

    fn cancelled(&self) -> DispatchOutcome {
        self.sink.emit(&OrchestrationEvent::Cancelled {
            operation: "audio dispatch".to_owned(),
        });
        DispatchOutcome::failure(CANCELLED_MESSAGE, PathTaken::AiOnlyFailed)
    }

    fn finish(&self, outcome: DispatchOutcome) -> DispatchOutcome {
        self.sink.emit(&OrchestrationEvent::DispatchFinished {
            kind: CommandKind::Audio,
            path: outcome.path_taken,
            succeeded: outcome.succeeded,
        });
        outcome
    }
}
