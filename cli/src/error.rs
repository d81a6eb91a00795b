use api_harness::HarnessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::Harness(HarnessError::ConfigNotFound { path }) => format!(
                "Configuration file not found: {} (run `apiharness init` to create one)",
                path.display()
            ),
            Self::Harness(err) if err.is_configuration_error() => {
                format!("Configuration problem: {err}")
            }
            Self::Harness(err) => err.to_string(),
            Self::Json(err) => format!("Failed to serialize JSON: {err}"),
            Self::Other(msg) => msg.clone(),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chains_user_messages() {
        let err: Result<()> = Err(HarnessError::UnknownEnvironment {
            environment: "prod".to_string(),
            available: "ci, local".to_string(),
        })
        .with_context(|| "Failed to run suite");

        let message = err.unwrap_err().user_message();
        assert!(message.starts_with("Failed to run suite: Configuration problem"));
        assert!(message.contains("ci, local"));
    }
}
