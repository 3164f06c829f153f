//! Error types for the admin orchestration core.
//!
//! Dispatch and reconciliation never surface these: their failures become
//! [`crate::DispatchOutcome`] and [`crate::ReconciliationReport`] values.
//! `AdminError` covers the library boundary (configuration, construction,
//! direct reads).

use commerce_gateway::GatewayError;

/// Top-level error type for the admin core.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Backend gateway error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AdminError>;
