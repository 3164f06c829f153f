//! Gateway configuration with defaults for the promotion/product backend.
//!
//! [`GatewayConfig`] controls where the backend lives, how requests are
//! authenticated, and how relation records are named on the wire.

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Configuration for the commerce backend HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Auth token. When `None` no `Authorization` header is sent.
    pub token: Option<String>,
    /// Scheme placed before the token in the `Authorization` header.
    pub auth_scheme: String,
    /// Client-level HTTP timeout in seconds. Should exceed the dispatch
    /// deadline so the orchestration layer decides when to give up.
    pub request_timeout_secs: u64,
    /// AI availability endpoint.
    pub status_path: String,
    /// Text command endpoint (AI or local interpretation).
    pub text_command_path: String,
    /// Multipart audio command endpoint.
    pub audio_command_path: String,
    /// Relation collection endpoint. Items live at `{relation_path}{id}/`.
    pub relation_path: String,
    /// Wire names of relation record fields.
    pub relation_fields: RelationFields,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_owned(),
            token: None,
            auth_scheme: "Token".to_owned(),
            request_timeout_secs: 120,
            status_path: "/reportes/status/".to_owned(),
            text_command_path: "/reportes/voz/".to_owned(),
            audio_command_path: "/reportes/voz/audio/".to_owned(),
            relation_path: "/productospromociones/".to_owned(),
            relation_fields: RelationFields::default(),
        }
    }
}

/// Field names used by the backend for one many-to-many link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationFields {
    /// Owner id field in create bodies and records (e.g. the promotion).
    pub owner_id: String,
    /// Member id field in create bodies and records (e.g. the product).
    pub member_id: String,
    /// Key under which the backend may nest the full member object.
    pub member_object: String,
    /// Query parameter filtering the collection by owner.
    pub owner_filter: String,
    /// Creation timestamp field.
    pub created_at: String,
}

impl Default for RelationFields {
    fn default() -> Self {
        Self {
            owner_id: "promocion_id".to_owned(),
            member_id: "producto_id".to_owned(),
            member_object: "producto".to_owned(),
            owner_filter: "promocion".to_owned(),
            created_at: "fecha".to_owned(),
        }
    }
}

impl GatewayConfig {
    /// Create a config pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Attach an auth token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the client-level request timeout.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::Config("base_url must not be empty".into()));
        }
        url::Url::parse(self.base_url.trim())
            .map_err(|e| GatewayError::Config(format!("base_url is not a valid URL: {e}")))?;
        if self.request_timeout_secs == 0 {
            return Err(GatewayError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.auth_scheme.trim().is_empty() {
            return Err(GatewayError::Config("auth_scheme must not be empty".into()));
        }
        let fields = &self.relation_fields;
        if fields.owner_id.is_empty() || fields.member_id.is_empty() {
            return Err(GatewayError::Config(
                "relation field names must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Join the base URL with an endpoint path, tolerating stray slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL of a single relation record.
    pub fn relation_item(&self, relation_id: u64) -> String {
        let collection = self.endpoint(&self.relation_path);
        format!("{}/{relation_id}/", collection.trim_end_matches('/'))
    }

    /// Value of the `Authorization` header, if a token is configured.
    pub fn authorization(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("{} {t}", self.auth_scheme.trim()))
    }
}
