//! Merge rules: defaults sit at the bottom, every later source overrides them.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_CLIENT_ID, DEFAULT_CLIENT_VERSION, DEFAULT_CONTEXT_EVENT,
    DEFAULT_PRICE_LIST_UDO_META_NAME,
};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("client.id", DEFAULT_CLIENT_ID)?
        .set_default("client.version", DEFAULT_CLIENT_VERSION)?
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("shell.context_event", DEFAULT_CONTEXT_EVENT)?
        .set_default(
            "permissions.price_list_udo_meta_name",
            DEFAULT_PRICE_LIST_UDO_META_NAME,
        )
}
