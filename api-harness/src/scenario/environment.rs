use crate::error::{HarnessError, Result};
use crate::health::HealthChecker;
use crate::traits::TestDatabase;
use std::time::Duration;
use tracing::{info, warn};

/// Wait for every registered service, then prepare the database
pub async fn setup_environment<D: TestDatabase>(
    checker: &HealthChecker,
    database: &D,
    max_wait: Duration,
) -> Result<()> {
    info!(services = ?checker.service_names(), "Setting up test environment");

    if !checker.wait_for_services(max_wait).await {
        let report = checker.check_all_services().await;
        let services = report.unhealthy().join(", ");
        warn!(%services, "Environment setup aborted");
        return Err(HarnessError::ServicesUnavailable {
            waited_ms: max_wait.as_millis() as u64,
            services,
        });
    }

    database.setup().await?;
    info!("Test environment ready");
    Ok(())
}

pub async fn teardown_environment<D: TestDatabase>(database: &D) -> Result<()> {
    info!("Tearing down test environment");
    database.cleanup().await
}
