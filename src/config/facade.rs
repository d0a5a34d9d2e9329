//! Config loader: assembles sources in precedence order and validates the result.

use super::merge::merge_policy;
use super::sources::{environment, global_file};
use super::PartnerConfig;
use crate::error::ApiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`PartnerConfig`] from defaults, files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the user-level config file (if present) and environment overrides.
    pub fn load() -> Result<PartnerConfig, ApiError> {
        Self::load_with(None)
    }

    /// Like [`ConfigLoader::load`], with an explicit file layered above the user-level file.
    pub fn load_with(explicit: Option<&Path>) -> Result<PartnerConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = environment::add_to_builder(builder);

        let config: PartnerConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load a single file on top of the defaults; no user-level file, no environment.
    pub fn load_from_file(path: &Path) -> Result<PartnerConfig, ApiError> {
        let config: PartnerConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()?;
        debug!(config_path = %path.display(), "Loaded configuration file");
        Self::validated(config)
    }

    /// Path of the user-level config file, whether or not it exists
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn validated(config: PartnerConfig) -> Result<PartnerConfig, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
