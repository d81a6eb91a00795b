use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Error type returned by application handlers under test
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for every harness layer
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown environment '{environment}'. Available environments: {available}")]
    UnknownEnvironment {
        environment: String,
        available: String,
    },

    #[error("Unknown service '{service}'")]
    UnknownService { service: String },

    #[error("Unknown scenario '{scenario}'")]
    UnknownScenario { scenario: String },

    #[error("Scenario '{scenario}' is already registered")]
    DuplicateScenario { scenario: String },

    #[error("Handler failed: {0}")]
    Handler(HandlerError),

    #[error("Response declared JSON but body could not be parsed: {message}")]
    InvalidResponseBody { message: String },

    #[error("Assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Services not healthy after {waited_ms}ms: {services}")]
    ServicesUnavailable { waited_ms: u64, services: String },
}

impl HarnessError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new command failure error
    pub fn command_failed<S: Into<String>>(command: S, message: S) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether this error is a caller/test-authoring defect rather than a runtime condition
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::InvalidConfig { .. }
                | Self::UnknownEnvironment { .. }
                | Self::UnknownService { .. }
                | Self::UnknownScenario { .. }
                | Self::DuplicateScenario { .. }
        )
    }
}

/// Failed expectation on a captured response or matrix
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionFailure {
    #[error("expected status {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },

    #[error("expected a JSON body, got text: {body}")]
    NotJson { body: String },

    #[error("missing field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' has the wrong shape: {message}")]
    Shape { field: String, message: String },

    #[error("item {index} belongs to tenant '{actual}', expected '{expected}'")]
    TenantLeak {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("role matrix violated: {}", violations.join("; "))]
    RoleMatrix { violations: Vec<String> },

    #[error("{0}")]
    Custom(String),
}

impl AssertionFailure {
    /// Create a free-form assertion failure, used by scenario verify steps
    pub fn custom<S: Into<String>>(message: S) -> Self {
        Self::Custom(message.into())
    }
}
