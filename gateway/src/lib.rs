//! # commerce-gateway
//!
//! HTTP access to the commerce backend used by the admin dashboard core.
//!
//! The backend exposes an AI availability probe, text and audio report
//! commands, and CRUD endpoints for many-to-many relations (promotion ↔
//! product). None of it is transactional and any call may be slow or fail,
//! so this crate only moves bytes and decodes errors; deciding what to do
//! about failures belongs to the caller.
//!
//! ## Design
//!
//! - [`BackendGateway`] is the seam: orchestration code depends on the trait,
//!   tests substitute scripted implementations
//! - [`HttpGateway`] implements it with a single shared [`reqwest::Client`]
//! - Non-2xx bodies are reduced to one message (`detail` → `message` →
//!   `error` → per-field map → status text)
//! - Relation field names are configurable so the same client serves other
//!   owner/member pairs
//!
//! ## Security
//!
//! - Auth tokens are sent only in the `Authorization` header and never
//!   appear in `Debug` output or error messages
//! - Request and response bodies are logged only at trace level

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod types;

pub use client::HttpGateway;
pub use config::{GatewayConfig, RelationFields};
pub use error::{GatewayError, Result};
pub use gateway::BackendGateway;
pub use types::{
    AudioClip, CommandResponse, RelationRecord, ReportPayload, ReportRows, ServiceState,
    StatusResponse, TextCommandRequest,
};
