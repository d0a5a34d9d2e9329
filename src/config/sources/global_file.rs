//! User-level config file source: `<config dir>/partner-link/config.toml`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the user-level config file.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "coresuite", "partner-link")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the user-level config file to the builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            builder = builder.add_source(File::from(path).required(false));
        } else {
            debug!(config_path = %path.display(), "No user-level configuration file");
        }
    }
    Ok(builder)
}
