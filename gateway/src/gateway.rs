//! The [`BackendGateway`] seam between orchestration logic and the backend.
//!
//! The HTTP implementation lives in [`crate::client`]. Tests and alternative
//! transports implement the trait directly.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{AudioClip, CommandResponse, RelationRecord, StatusResponse, TextCommandRequest};

/// Operations the commerce backend exposes to the admin core.
///
/// Every call is a network round trip that may be slow, fail, or partially
/// succeed across a batch. Implementations must be `Send + Sync` so one
/// gateway can be shared by concurrent dispatches behind an `Arc`.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Query AI availability.
    async fn status(&self) -> Result<StatusResponse, GatewayError>;

    /// Submit a text command to the AI or local interpreter.
    ///
    /// A response with `success: false` is returned as `Ok`; only transport
    /// failures and non-2xx statuses are `Err`.
    async fn submit_text(
        &self,
        request: &TextCommandRequest,
    ) -> Result<CommandResponse, GatewayError>;

    /// Submit a recorded audio command to the AI interpreter.
    async fn submit_audio(&self, clip: &AudioClip) -> Result<CommandResponse, GatewayError>;

    /// Create one owner→member link.
    async fn create_relation(
        &self,
        owner_id: u64,
        member_id: u64,
    ) -> Result<RelationRecord, GatewayError>;

    /// Delete one link by its record id.
    async fn delete_relation(&self, relation_id: u64) -> Result<(), GatewayError>;

    /// List the links currently stored for an owner.
    async fn list_relations(&self, owner_id: u64) -> Result<Vec<RelationRecord>, GatewayError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "backend"
    }
}
