use crate::config::types::HarnessConfig;
use crate::config::validator::ConfigValidatorImpl;
use crate::error::{HarnessError, Result};
use std::path::Path;
use tracing::debug;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "harness.toml";

/// Configuration loader trait
pub trait ConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<HarnessConfig>;
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<HarnessConfig>;
}

/// Default configuration loader implementation
pub struct DefaultConfigLoader;

impl ConfigLoader for DefaultConfigLoader {
    /// Load configuration from a harness.toml file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<HarnessConfig> {
        let content = std::fs::read_to_string(&path).map_err(|_| HarnessError::ConfigNotFound {
            path: path.as_ref().to_path_buf(),
        })?;

        let config: HarnessConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate, naming the file in any error
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<HarnessConfig> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(HarnessError::ConfigNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref)?;
        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            HarnessError::invalid_config(format!(
                "Failed to parse TOML in {}: {}",
                path_ref.display(),
                e
            ))
        })?;

        ConfigValidatorImpl.validate_with_context(&config, path_ref)?;
        debug!(path = %path_ref.display(), "Configuration loaded");
        Ok(config)
    }
}

impl HarnessConfig {
    /// Create a new config builder
    pub fn builder() -> crate::config::builder::HarnessConfigBuilder {
        crate::config::builder::HarnessConfigBuilder::new()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_from_file(path)
    }

    pub fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_with_validation(path)
    }

    /// Load `path` if it exists, otherwise fall back to the built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_with_validation(path)
        } else {
            debug!(path = %path.as_ref().display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }
}
