pub mod builder;
pub mod loader;
pub mod templates;
pub mod types;
pub mod validator;

pub use builder::HarnessConfigBuilder;
pub use loader::{ConfigLoader, DefaultConfigLoader, DEFAULT_CONFIG_FILE};
pub use templates::{ensure_config_file_exists, generate_default_config_template};
pub use types::{
    EnvironmentConfig, HarnessConfig, LoadSettings, ReportSettings, ScenarioSettings,
    ServiceEntry, SuiteCommand,
};
pub use validator::ConfigValidatorImpl;
