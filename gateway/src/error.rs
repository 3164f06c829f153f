//! Error types for the commerce-gateway crate.
//!
//! Messages are stable and safe to show to users. Auth tokens never appear
//! in error messages.

/// Errors that can occur while talking to the commerce backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The HTTP client gave up waiting for the response.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status code.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the status text.
        message: String,
        /// `true` when `message` came from a JSON error body rather than
        /// from the status line or a non-JSON page.
        from_body: bool,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid gateway configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Returns the HTTP status code when the backend answered with an error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the failure says nothing about the request itself:
    /// the backend was unreachable, too slow, or failed with a 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Config(_) => false,
        }
    }

    /// Returns `true` if the backend never produced a usable answer:
    /// unreachable, too slow, or a 5xx without a JSON error message.
    ///
    /// A 5xx carrying a structured message is the backend reporting on the
    /// request itself and is not an outage.
    pub fn is_outage(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status {
                status, from_body, ..
            } => *status >= 500 && !*from_body,
            Self::Decode(_) | Self::Config(_) => false,
        }
    }

    /// Returns the message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(m) | Self::Timeout(m) | Self::Decode(m) | Self::Config(m) => m,
            Self::Status { message, .. } => message,
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Convenience type alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
