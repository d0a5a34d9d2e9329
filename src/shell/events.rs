//! Payloads exchanged with the shell for the context handshake.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token response type requested from the shell
pub const TOKEN_RESPONSE_TYPE: &str = "token";

/// Auth mode requested alongside the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub response_type: String,
}

impl Default for AuthRequest {
    fn default() -> Self {
        Self {
            response_type: TOKEN_RESPONSE_TYPE.to_string(),
        }
    }
}

/// Request emitted to the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    pub client_identifier: String,
    pub auth: AuthRequest,
    pub correlation_id: String,
}

impl ContextRequest {
    pub fn new(client_identifier: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            client_identifier: client_identifier.into(),
            auth: AuthRequest::default(),
            correlation_id: correlation_id.into(),
        }
    }
}

/// A request and its response share the event name; requests carry `clientIdentifier`.
pub fn is_context_request(payload: &Value) -> bool {
    payload.get("clientIdentifier").is_some()
}

/// Correlation id echoed by the shell, if any
pub fn correlation_id(payload: &Value) -> Option<&str> {
    payload.get("correlationId").and_then(Value::as_str)
}
