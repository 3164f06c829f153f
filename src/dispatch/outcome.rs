//! Result values handed back to the UI after a dispatch.

use bytes::Bytes;
use commerce_gateway::{CommandResponse, ReportPayload};
use serde::Serialize;
use std::fmt;

/// A user command, immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Typed command.
    Text { content: String },
    /// Recorded voice command.
    Audio { payload: Bytes, filename: String },
}

impl Command {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn audio(payload: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self::Audio {
            payload: payload.into(),
            filename: filename.into(),
        }
    }
}

/// Which interpreter produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathTaken {
    /// The AI interpreter answered (success or domain error).
    Ai,
    /// The local interpreter answered successfully, or was the only path tried.
    Local,
    /// The AI attempt failed and nothing recovered it.
    AiOnlyFailed,
}

impl fmt::Display for PathTaken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ai => "ai",
            Self::Local => "local",
            Self::AiOnlyFailed => "ai-only-failed",
        })
    }
}

/// Why the AI attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The response named the AI provider (quota, auth, outage).
    ProviderError,
    /// The deadline fired before the AI call completed.
    Timeout,
    /// The backend could not be reached or failed with a 5xx.
    Transport,
    /// The AI task ended without producing a response.
    Aborted,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ProviderError => "provider_error",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Aborted => "aborted",
        })
    }
}

/// Outcome of one dispatch, success or not. Never an `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub succeeded: bool,
    /// Report passed through verbatim from the interpreter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub path_taken: PathTaken,
    /// Command as the interpreter understood or transcribed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreted_command: Option<String>,
    /// Informational message from the interpreter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set when the AI attempt was abandoned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl DispatchOutcome {
    /// Outcome mirroring an interpreter response.
    pub fn from_response(response: CommandResponse, path_taken: PathTaken) -> Self {
        let interpreted_command = response.interpreted_command().map(str::to_owned);
        let error_message = if response.success {
            None
        } else {
            Some(
                response
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "the interpreter reported a failure".to_owned()),
            )
        };
        Self {
            succeeded: response.success,
            report: response.reporte,
            error_message,
            path_taken,
            interpreted_command,
            message: response.mensaje,
            fallback_reason: None,
        }
    }

    /// Failed outcome carrying only a message.
    pub fn failure(message: impl Into<String>, path_taken: PathTaken) -> Self {
        Self {
            succeeded: false,
            report: None,
            error_message: Some(message.into()),
            path_taken,
            interpreted_command: None,
            message: None,
            fallback_reason: None,
        }
    }

    pub(crate) fn with_fallback_reason(mut self, reason: FallbackReason) -> Self {
        self.fallback_reason = Some(reason);
        self
    }
}
