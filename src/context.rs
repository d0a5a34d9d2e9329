//! Authentication Context
//!
//! The session bundle handed out by the shell (token, tenant identifiers, expiry) and the
//! machinery that keeps a valid one at hand.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod cache;
pub mod clock;
pub mod provider;

pub use cache::CachedContext;
pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::ContextProvider;

/// Access token issued by the shell
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    /// Lifetime in seconds from the moment the context is received
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Context obtained from the shell. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub auth: AuthToken,
    /// Account name
    pub account: String,
    #[serde(deserialize_with = "string_or_number")]
    pub account_id: String,
    /// Company name
    pub company: String,
    #[serde(deserialize_with = "string_or_number")]
    pub company_id: String,
    /// User name
    pub user: String,
}

/// Tenant query parameters appended to every query API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub account: String,
    pub company: String,
}

impl AuthContext {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            account: self.account.clone(),
            company: self.company.clone(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.auth.access_token)
    }
}

/// Shells send tenant ids either as strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
