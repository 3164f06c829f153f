//! Wire types exchanged with the commerce backend.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::config::RelationFields;
use crate::error::GatewayError;

/// Overall backend health reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// Everything is up.
    Operacional,
    /// Some subsystems (typically the AI provider) are down.
    Degradado,
    /// The report service is down.
    Caido,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operacional => "operacional",
            Self::Degradado => "degradado",
            Self::Caido => "caido",
        })
    }
}

/// Body of the AI availability endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Whether the request itself succeeded.
    #[serde(default)]
    pub success: Option<bool>,
    /// Overall service state.
    #[serde(default)]
    pub status: Option<ServiceState>,
    /// Whether the AI interpreter can currently take commands.
    #[serde(default)]
    pub ia_disponible: bool,
}

/// Body of a text command submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCommandRequest {
    /// The command as typed by the user.
    pub comando: String,
    /// `true` routes to the AI interpreter, `false` to the local parser.
    pub usar_ia: bool,
}

impl TextCommandRequest {
    /// Request for the AI interpreter.
    pub fn ai(comando: impl Into<String>) -> Self {
        Self {
            comando: comando.into(),
            usar_ia: true,
        }
    }

    /// Request for the deterministic local interpreter.
    pub fn local(comando: impl Into<String>) -> Self {
        Self {
            comando: comando.into(),
            usar_ia: false,
        }
    }
}

/// A recorded audio clip ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Raw encoded audio (webm/ogg/wav as produced by the recorder).
    pub payload: Bytes,
    /// File name announced in the multipart part.
    pub filename: String,
}

impl AudioClip {
    pub fn new(payload: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            filename: filename.into(),
        }
    }
}

/// Raw rows of a report: either a list of rows or a keyed mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportRows {
    /// Sequence of row objects.
    Rows(Vec<Value>),
    /// Rows grouped under keys.
    Keyed(Map<String, Value>),
}

impl ReportRows {
    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Keyed(map) => map.len(),
        }
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Report produced by an interpreter. Opaque to this crate: every field is
/// passed through verbatim, including ones not modelled here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Value>,
    /// Named metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<Map<String, Value>>,
    /// Raw rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datos: Option<ReportRows>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body returned by the text and audio command endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporte: Option<ReportPayload>,
    /// Command as understood by the text interpreter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comando_procesado: Option<String>,
    /// Command transcribed from audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comando_detectado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtros_aplicados: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CommandResponse {
    /// The interpreted command, whichever endpoint produced it.
    pub fn interpreted_command(&self) -> Option<&str> {
        self.comando_procesado
            .as_deref()
            .or(self.comando_detectado.as_deref())
    }
}

/// One stored many-to-many link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Backend-generated record id (used for deletion).
    pub id: u64,
    pub owner_id: u64,
    pub member_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl RelationRecord {
    /// Decode a record using the configured wire field names.
    ///
    /// The member id is read from `fields.member_id`, or from the `id` of a
    /// nested object under `fields.member_object` when the backend expands it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] if the id, owner or member is missing.
    pub fn from_wire(value: &Value, fields: &RelationFields) -> Result<Self, GatewayError> {
        let obj = value
            .as_object()
            .ok_or_else(|| GatewayError::Decode("relation record is not an object".into()))?;

        let id = obj
            .get("id")
            .and_then(as_id)
            .ok_or_else(|| GatewayError::Decode("relation record has no id".into()))?;

        let owner_id = obj.get(&fields.owner_id).and_then(as_id).ok_or_else(|| {
            GatewayError::Decode(format!("relation record {id} has no {}", fields.owner_id))
        })?;

        let member_id = obj
            .get(&fields.member_id)
            .and_then(as_id)
            .or_else(|| {
                obj.get(&fields.member_object)
                    .and_then(|m| m.get("id").and_then(as_id).or_else(|| as_id(m)))
            })
            .ok_or_else(|| {
                GatewayError::Decode(format!("relation record {id} has no {}", fields.member_id))
            })?;

        let created_at = obj
            .get(&fields.created_at)
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            id,
            owner_id,
            member_id,
            created_at,
        })
    }
}

/// Ids may come back as numbers or numeric strings.
fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Unwrap a list response that is either a bare array or `{results: [...]}`.
pub fn list_items(body: Value) -> Result<Vec<Value>, GatewayError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(GatewayError::Decode(
                "list response is neither an array nor a results envelope".into(),
            )),
        },
        _ => Err(GatewayError::Decode("list response is not JSON array".into())),
    }
}
