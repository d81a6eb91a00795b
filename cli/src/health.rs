use crate::error::{CliError, Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::ui;
use api_harness::config::HarnessConfig;
use api_harness::health::{HealthChecker, ServiceConfig, ServiceKind};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// Timeout for the environment's own health endpoint
const API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HealthArgs {
    pub environment: Option<String>,
    pub wait_secs: Option<u64>,
    pub config_path: String,
}

/// Check services and return 0 when all are healthy, 1 otherwise
pub fn execute(args: HealthArgs) -> Result<i32> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;
    rt.block_on(execute_async(args))
}

async fn execute_async(args: HealthArgs) -> Result<i32> {
    let config = HarnessConfig::load_or_default(&args.config_path)
        .with_context(|| format!("Failed to load {}", args.config_path))?;
    let mut checker = HealthChecker::from_config(&config)?;

    if let Some(name) = &args.environment {
        let environment = config.environment(name)?;
        checker.add_service_config(
            "api",
            ServiceConfig {
                url: format!("{}/api/health", environment.base_url.trim_end_matches('/')),
                timeout: API_TIMEOUT,
                kind: ServiceKind::Http,
            },
        );
    }

    if checker.service_names().is_empty() {
        ui::warning_message("No services configured");
        return Ok(0);
    }

    debug!(services = ?checker.service_names(), "Checking services");
    ui::section_header("Service health");
    if let Some(secs) = args.wait_secs {
        let progress = ProgressTracker::start(&format!(
            "Waiting up to {}s for {}",
            secs,
            checker.service_names().join(", ")
        ));
        if checker.wait_for_services(Duration::from_secs(secs)).await {
            progress.complete();
        } else {
            progress.fail("services still unhealthy");
        }
    }

    let report = checker.check_all_services().await;
    println!("{}", ui::health_table(&report));

    if report.all_healthy() {
        ui::success_message("All services healthy");
        Ok(0)
    } else {
        ui::error_message(&format!("Unhealthy: {}", report.unhealthy().join(", ")));
        Ok(1)
    }
}
