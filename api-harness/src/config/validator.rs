use crate::config::types::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::suite::SuiteKind;
use crate::traits::ConfigValidator;
use std::path::Path;

/// Longest accepted service timeout
const MAX_SERVICE_TIMEOUT_MS: u64 = 300_000;

/// Configuration validator implementation
pub struct ConfigValidatorImpl;

impl ConfigValidator for ConfigValidatorImpl {
    type Config = HarnessConfig;

    fn validate(&self, config: &HarnessConfig) -> Result<()> {
        self.validate_with_context(config, "configuration")
    }
}

impl Default for ConfigValidatorImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidatorImpl {
    pub fn new() -> Self {
        Self
    }

    /// Validation with the config path included in every message
    pub fn validate_with_context<P: AsRef<Path>>(
        &self,
        config: &HarnessConfig,
        config_path: P,
    ) -> Result<()> {
        let source = config_path.as_ref().to_string_lossy();

        if config.environments.is_empty() {
            return Err(HarnessError::invalid_config(format!(
                "No environments configured in {}. Add at least one [environments.<name>] section.",
                source
            )));
        }

        for (name, env) in &config.environments {
            if url::Url::parse(&env.base_url).is_err() {
                return Err(HarnessError::invalid_config(format!(
                    "Invalid base_url '{}' in environment '{}'. Must be a valid URL.",
                    env.base_url, name
                )));
            }
            if url::Url::parse(&env.database_url).is_err() {
                return Err(HarnessError::invalid_config(format!(
                    "Invalid database_url '{}' in environment '{}'. Must be a valid URL.",
                    env.database_url, name
                )));
            }
            if let Some(flag) = env
                .features
                .keys()
                .find(|flag| flag.is_empty() || !flag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            {
                return Err(HarnessError::invalid_config(format!(
                    "Feature flag '{}' in environment '{}' must contain only letters, digits and underscores",
                    flag, name
                )));
            }
        }

        for (name, service) in &config.services {
            if url::Url::parse(&service.url).is_err() {
                return Err(HarnessError::invalid_config(format!(
                    "Invalid url '{}' for service '{}'",
                    service.url, name
                )));
            }
            if service.timeout_ms == 0 || service.timeout_ms > MAX_SERVICE_TIMEOUT_MS {
                return Err(HarnessError::invalid_config(format!(
                    "timeout_ms for service '{}' must be between 1 and {}",
                    name, MAX_SERVICE_TIMEOUT_MS
                )));
            }
        }

        for (name, suite) in &config.suites {
            match name.parse::<SuiteKind>() {
                Ok(SuiteKind::All) | Err(_) => {
                    return Err(HarnessError::invalid_config(format!(
                        "Unknown suite '{}' in {}. Valid suites: {}",
                        name,
                        source,
                        SuiteKind::CONCRETE
                            .iter()
                            .map(|k| k.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
                Ok(kind) if kind.as_str() != name.as_str() => {
                    return Err(HarnessError::invalid_config(format!(
                        "Suite '{}' in {} must be named '{}'",
                        name,
                        source,
                        kind.as_str()
                    )));
                }
                Ok(_) => {}
            }
            if suite.command.trim().is_empty() {
                return Err(HarnessError::invalid_config(format!(
                    "Suite '{}' has an empty command",
                    name
                )));
            }
        }

        if config.load.concurrent_users == 0 {
            return Err(HarnessError::invalid_config(
                "load.concurrent_users must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&config.load.max_error_rate) {
            return Err(HarnessError::invalid_config(
                "load.max_error_rate must be between 0.0 and 1.0",
            ));
        }
        if config.load.max_p95_ms <= 0.0 {
            return Err(HarnessError::invalid_config(
                "load.max_p95_ms must be positive",
            ));
        }

        Ok(())
    }
}
