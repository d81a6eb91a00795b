use crate::config::types::{
    EnvironmentConfig, HarnessConfig, LoadSettings, ReportSettings, ScenarioSettings,
    ServiceEntry, SuiteCommand,
};
use crate::config::validator::ConfigValidatorImpl;
use crate::error::Result;
use crate::health::ServiceKind;
use crate::suite::SuiteKind;
use crate::traits::ConfigValidator;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Builder for HarnessConfig to improve API ergonomics
pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    /// Start with no environments, services or suites
    pub fn new() -> Self {
        Self {
            config: HarnessConfig {
                environments: BTreeMap::new(),
                services: BTreeMap::new(),
                suites: BTreeMap::new(),
                load: LoadSettings::default(),
                scenarios: ScenarioSettings::default(),
                reports: ReportSettings::default(),
            },
        }
    }

    /// Start from the built-in defaults
    pub fn from_defaults() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    #[must_use]
    pub fn environment<S: Into<String>>(self, name: S, base_url: S, database_url: S) -> Self {
        self.environment_config(name, EnvironmentConfig::new(base_url, database_url))
    }

    #[must_use]
    pub fn environment_config<S: Into<String>>(mut self, name: S, environment: EnvironmentConfig) -> Self {
        self.config.environments.insert(name.into(), environment);
        self
    }

    /// Add a service; the kind is inferred from its name and URL
    #[must_use]
    pub fn service<S: Into<String>>(mut self, name: S, url: S, timeout_ms: u64) -> Self {
        self.config.services.insert(
            name.into(),
            ServiceEntry {
                url: url.into(),
                timeout_ms,
                kind: None,
            },
        );
        self
    }

    #[must_use]
    pub fn service_of_kind<S: Into<String>>(
        mut self,
        name: S,
        url: S,
        timeout_ms: u64,
        kind: ServiceKind,
    ) -> Self {
        self.config.services.insert(
            name.into(),
            ServiceEntry {
                url: url.into(),
                timeout_ms,
                kind: Some(kind),
            },
        );
        self
    }

    #[must_use]
    pub fn suite<S: Into<String>>(mut self, kind: SuiteKind, command: S, args: &[&str]) -> Self {
        self.config
            .suites
            .insert(kind.as_str().to_string(), SuiteCommand::new(command, args));
        self
    }

    #[must_use]
    pub fn load_settings(mut self, load: LoadSettings) -> Self {
        self.config.load = load;
        self
    }

    /// Per-step scenario deadline; `None` disables it
    #[must_use]
    pub fn step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.scenarios.step_timeout_ms = timeout.map_or(0, |t| t.as_millis() as u64);
        self
    }

    #[must_use]
    pub fn reports_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.reports.dir = dir.into();
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid (e.g., no environments defined)
    pub fn build(self) -> Result<HarnessConfig> {
        ConfigValidatorImpl.validate(&self.config)?;
        Ok(self.config)
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentConfig {
    pub fn new<S: Into<String>>(base_url: S, database_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            database_url: database_url.into(),
            api_key: None,
            features: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_feature<S: Into<String>>(mut self, flag: S, enabled: bool) -> Self {
        self.features.insert(flag.into(), enabled);
        self
    }
}
