//! Error types for the partner link client.

use thiserror::Error;

/// Shell handshake errors
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Shell SDK has not been set")]
    NotInitialized,

    #[error("Shell SDK has already been set")]
    AlreadyInitialized,

    #[error("Failed to emit shell event {event}: {message}")]
    EmitFailed { event: String, message: String },

    #[error("Failed to listen for shell event {event}: {message}")]
    SubscribeFailed { event: String, message: String },

    #[error("Malformed context payload: {0}")]
    MalformedContext(String),

    #[error("Shell did not answer {event} within {timeout_ms}ms")]
    Timeout { event: String, timeout_ms: u64 },

    #[error("Context request cancelled")]
    Cancelled,

    #[error("Shell listener closed before a context arrived")]
    ListenerClosed,
}

/// Errors surfaced by the client facade
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),

    #[error("Failed to fetch {resource}, got status {status}")]
    FetchFailed { resource: &'static str, status: u16 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to decode {resource} response: {message}")]
    Decode {
        resource: &'static str,
        message: String,
    },

    #[error("Invalid header value for {name}: {message}")]
    InvalidHeader { name: &'static str, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid query value for {name}: {reason}")]
    InvalidQueryValue { name: String, reason: String },

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Person not resolvable for user {0}")]
    PersonNotResolvable(String),

    #[error("Invalid unified person id: {0}")]
    InvalidUnifiedPersonId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl ApiError {
    /// Whether the error came from the shell handshake rather than the remote API
    pub fn is_shell(&self) -> bool {
        matches!(self, ApiError::Shell(_))
    }
}
