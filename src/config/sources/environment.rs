//! Environment source: `PARTNER_LINK__<SECTION>__<KEY>`, e.g. `PARTNER_LINK__API__BASE_URL`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "PARTNER_LINK";

/// Add environment overrides to the builder. Always the last source.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
