//! Shared HTTP plumbing: client construction and error-body decoding.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Build a [`reqwest::Client`] for the commerce backend.
///
/// # Errors
///
/// Returns [`GatewayError::Config`] if the client cannot be constructed.
pub fn build_client(config: &GatewayConfig) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(concat!("commerce-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))
}

/// Consume a response, returning its JSON body or a [`GatewayError::Status`].
///
/// An empty success body decodes to `Value::Null`.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GatewayError::from_reqwest(&e))?;
    tracing::trace!(status = status.as_u16(), body = %text, "backend response");

    if !status.is_success() {
        let body_message = json_error_message(&text);
        return Err(GatewayError::Status {
            status: status.as_u16(),
            from_body: body_message.is_some(),
            message: body_message.unwrap_or_else(|| extract_error_message(status, &text)),
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| GatewayError::Decode(format!("response is not valid JSON: {e}")))
}

/// Pick the most useful message out of an error body.
///
/// Priority: `detail` → `message` → `error` → per-field map
/// (`field: a, b; other: c`) → `HTTP <code> <reason>`. A body that is not
/// JSON is used as the detail when non-empty.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    json_error_message(body)
        .or_else(|| plain_text(body))
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
            None => format!("HTTP {}", status.as_u16()),
        })
}

/// Message carried by a JSON error body, if any.
pub fn json_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<Value>(body.trim()).ok()?;

    let obj = match parsed {
        Value::Object(obj) => obj,
        Value::String(s) if !s.trim().is_empty() => return Some(s),
        _ => return None,
    };

    for key in ["detail", "message", "error"] {
        if let Some(msg) = obj.get(key).and_then(text_of) {
            return Some(msg);
        }
    }

    let fields = obj
        .iter()
        .filter_map(|(field, value)| text_of(value).map(|v| format!("{field}: {v}")))
        .collect::<Vec<_>>()
        .join("; ");

    if fields.trim().is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Non-JSON body text, truncated.
fn plain_text(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || serde_json::from_str::<Value>(trimmed).is_ok() {
        return None;
    }
    Some(trimmed.chars().take(500).collect())
}

/// Flatten a string, array of strings, or scalar into display text.
fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => return None,
        Value::Object(_) => return None,
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
