use crate::error::{CliError, Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::ui;
use api_harness::config::HarnessConfig;
use api_harness::suite::{SuiteKind, SuiteOptions, SuiteRunner};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub suite: SuiteKind,
    pub environment: String,
    pub coverage: bool,
    pub report: bool,
    pub reports_dir: Option<String>,
    pub config_path: String,
}

/// Run the suite and return the process exit code
pub fn execute(args: RunArgs) -> Result<i32> {
    let rt = Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;
    rt.block_on(execute_async(args))
}

async fn execute_async(args: RunArgs) -> Result<i32> {
    let config = HarnessConfig::load_or_default(&args.config_path)
        .with_context(|| format!("Failed to load {}", args.config_path))?;
    let reports_dir = args
        .reports_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.reports.dir.clone());
    debug!(config = %args.config_path, environment = %args.environment, "Loaded harness configuration");

    ui::section_header(&format!("{} tests on {}", args.suite, args.environment));
    let mut runner = SuiteRunner::new(config);
    let options = SuiteOptions {
        coverage: args.coverage,
        ..Default::default()
    };

    let progress = ProgressTracker::start(&format!("Running {} suite", args.suite));
    match runner.run_suite(args.suite, &args.environment, &options).await {
        Ok(_) => progress.complete(),
        Err(e) => {
            progress.fail(&e.to_string());
            return Err(CliError::from(e).with_context(format!("Suite '{}' failed to run", args.suite)));
        }
    }

    println!("{}", ui::suite_table(runner.results()));
    let summary = runner.summary();
    if summary.failed > 0 {
        ui::error_message(&ui::summary_line(&summary));
    } else {
        ui::success_message(&ui::summary_line(&summary));
    }

    if args.report {
        let path = runner
            .write_report(&reports_dir)
            .with_context(|| format!("Failed to write report to {}", reports_dir.display()))?;
        ui::info_message(&format!("Report written to {}", path.display()));
    }

    Ok(runner.exit_code())
}
