//! Configuration System
//!
//! Client identity, remote API endpoint, shell handshake tuning and logging. Values come
//! from built-in defaults, an optional user-level config file, an optional explicit file
//! and `PARTNER_LINK__*` environment variables, in that order of precedence.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Client identifier sent to the shell and in `X-Client-ID`
pub const DEFAULT_CLIENT_ID: &str = "fsm-ext-demo-uf4jra";
/// Client version sent in `X-Client-Version`
pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";
/// Query API host
pub const DEFAULT_BASE_URL: &str = "https://eu.coresuite.com";
/// Event used for both the context request and its response
pub const DEFAULT_CONTEXT_EVENT: &str = "V1.REQUIRE_CONTEXT";
/// Object metadata record whose visibility grants price list access
pub const DEFAULT_PRICE_LIST_UDO_META_NAME: &str = "Cennik_part";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartnerConfig {
    #[serde(default)]
    pub client: ClientIdentity,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub permissions: PermissionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identification sent with every request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientIdentity {
    #[serde(default = "default_client_id")]
    pub id: String,

    #[serde(default = "default_client_version")]
    pub version: String,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_client_version() -> String {
    DEFAULT_CLIENT_VERSION.to_string()
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            id: default_client_id(),
            version: default_client_version(),
        }
    }
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme and host, without a trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Shell handshake settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellConfig {
    #[serde(default = "default_context_event")]
    pub context_event: String,

    /// Upper bound for one context request, in milliseconds
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Subtracted from the token lifetime when computing expiry
    #[serde(default = "default_expiry_margin_ms")]
    pub expiry_margin_ms: i64,

    /// Accept context responses that carry no correlation id
    #[serde(default = "default_true")]
    pub accept_uncorrelated: bool,
}

fn default_context_event() -> String {
    DEFAULT_CONTEXT_EVENT.to_string()
}

fn default_handshake_timeout_ms() -> u64 {
    30_000
}

fn default_expiry_margin_ms() -> i64 {
    3_000
}

fn default_true() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            context_event: default_context_event(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            expiry_margin_ms: default_expiry_margin_ms(),
            accept_uncorrelated: default_true(),
        }
    }
}

impl ShellConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

/// Feature access probe settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionConfig {
    #[serde(default = "default_price_list_udo_meta_name")]
    pub price_list_udo_meta_name: String,
}

fn default_price_list_udo_meta_name() -> String {
    DEFAULT_PRICE_LIST_UDO_META_NAME.to_string()
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            price_list_udo_meta_name: default_price_list_udo_meta_name(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Client(String),
    Api(String),
    Shell(String),
    Permissions(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Client(msg) => write!(f, "Client: {}", msg),
            ValidationError::Api(msg) => write!(f, "Api: {}", msg),
            ValidationError::Shell(msg) => write!(f, "Shell: {}", msg),
            ValidationError::Permissions(msg) => write!(f, "Permissions: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PartnerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.client.id.trim().is_empty() {
            errors.push(ValidationError::Client("id cannot be empty".to_string()));
        }
        if self.client.version.trim().is_empty() {
            errors.push(ValidationError::Client("version cannot be empty".to_string()));
        }

        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            errors.push(ValidationError::Api(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.request_timeout_secs == 0 {
            errors.push(ValidationError::Api(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.shell.context_event.trim().is_empty() {
            errors.push(ValidationError::Shell("context_event cannot be empty".to_string()));
        }
        if self.shell.handshake_timeout_ms == 0 {
            errors.push(ValidationError::Shell(
                "handshake_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.shell.expiry_margin_ms < 0 {
            errors.push(ValidationError::Shell(
                "expiry_margin_ms cannot be negative".to_string(),
            ));
        }

        if self.permissions.price_list_udo_meta_name.trim().is_empty() {
            errors.push(ValidationError::Permissions(
                "price_list_udo_meta_name cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build a configuration pointed at another API host, keeping everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }
}
