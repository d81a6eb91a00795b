use crate::error::{HandlerError, Result};
use crate::types::{ApiRequest, HandlerOutput};
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;

/// Application request handler under test
pub trait Handler: Send + Sync {
    /// Handle one synthetic request
    fn handle(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = std::result::Result<HandlerOutput, HandlerError>> + Send;
}

impl<F, Fut> Handler for F
where
    F: Fn(ApiRequest) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<HandlerOutput, HandlerError>> + Send,
{
    fn handle(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = std::result::Result<HandlerOutput, HandlerError>> + Send {
        (self)(request)
    }
}

/// Lightweight readiness check for a non-HTTP dependency (database, cache)
///
/// `Ok` carries an optional payload describing the dependency; `Err` carries the
/// reason it is not ready.
pub trait ReadinessProbe: Send + Sync {
    fn probe(&self) -> BoxFuture<'_, std::result::Result<Option<Value>, String>>;
}

/// Runs the external test command for a suite
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        spec: &crate::suite::CommandSpec,
    ) -> impl Future<Output = Result<crate::suite::CommandOutput>> + Send;
}

/// Persistence collaborator consumed by scenario environment setup and assertions
pub trait TestDatabase: Send + Sync {
    /// Prepare the store for a test run (migrations, truncation)
    fn setup(&self) -> impl Future<Output = Result<()>> + Send;

    /// Remove everything the run created
    fn cleanup(&self) -> impl Future<Output = Result<()>> + Send;

    fn is_healthy(&self) -> impl Future<Output = bool> + Send;

    /// Insert records atomically: either all are stored or none are
    fn create_many(
        &self,
        collection: &str,
        records: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<Value>>> + Send;

    /// Count records, optionally restricted to one tenant
    fn count(
        &self,
        collection: &str,
        tenant_id: Option<&str>,
    ) -> impl Future<Output = Result<usize>> + Send;

    fn find(&self, collection: &str, id: &str) -> impl Future<Output = Result<Option<Value>>> + Send;
}

/// Validation of a loaded configuration
pub trait ConfigValidator {
    type Config;

    fn validate(&self, config: &Self::Config) -> Result<()>;
}
