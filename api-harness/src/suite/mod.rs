//! Suite runner: runs a tool per suite kind and aggregates the results.

mod command;
mod parser;

pub use command::{CommandOutput, CommandSpec, ProcessExecutor};
pub use parser::{parse_load_output, parse_test_output, CoverageSummary, ParsedOutput, PerformanceMetrics};

use crate::config::{EnvironmentConfig, HarnessConfig};
use crate::error::{HarnessError, Result};
use crate::report::ReportWriter;
use crate::traits::CommandExecutor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    Unit,
    Integration,
    E2e,
    Load,
    Security,
    Accessibility,
    All,
}

impl SuiteKind {
    /// Every kind `All` expands to, in execution order
    pub const CONCRETE: [SuiteKind; 6] = [
        SuiteKind::Unit,
        SuiteKind::Integration,
        SuiteKind::E2e,
        SuiteKind::Load,
        SuiteKind::Security,
        SuiteKind::Accessibility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SuiteKind::Unit => "unit",
            SuiteKind::Integration => "integration",
            SuiteKind::E2e => "e2e",
            SuiteKind::Load => "load",
            SuiteKind::Security => "security",
            SuiteKind::Accessibility => "accessibility",
            SuiteKind::All => "all",
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unit" => Ok(SuiteKind::Unit),
            "integration" => Ok(SuiteKind::Integration),
            "e2e" | "end-to-end" => Ok(SuiteKind::E2e),
            "load" | "performance" => Ok(SuiteKind::Load),
            "security" => Ok(SuiteKind::Security),
            "accessibility" | "a11y" => Ok(SuiteKind::Accessibility),
            "all" => Ok(SuiteKind::All),
            other => Err(HarnessError::invalid_config(format!(
                "unknown suite '{}'",
                other
            ))),
        }
    }
}

/// Per-run switches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteOptions {
    /// Append `--coverage` to the suite command
    pub coverage: bool,
    pub extra_args: Vec<String>,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResult {
    pub suite: SuiteKind,
    pub environment: String,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
    pub artifacts: Vec<String>,
}

impl SuiteResult {
    /// The single-failure result recorded when a suite cannot be run or parsed
    fn failure(suite: SuiteKind, environment: &str, duration: Duration) -> Self {
        Self {
            suite,
            environment: environment.to_string(),
            passed: 0,
            failed: 1,
            skipped: 0,
            duration,
            coverage: None,
            performance_metrics: None,
            artifacts: Vec::new(),
        }
    }

    pub fn total(&self) -> u32 {
        self.passed
            .saturating_add(self.failed)
            .saturating_add(self.skipped)
    }
}

/// Totals across every recorded result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Percentage of tests that passed; 0 when nothing ran
    pub success_rate: f64,
    #[serde(serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    pub suite_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestReport<'a> {
    generated_at: DateTime<Utc>,
    summary: SuiteSummary,
    results: &'a [SuiteResult],
}

/// Runs suites against configured environments and keeps every result for the run
pub struct SuiteRunner<E = ProcessExecutor> {
    config: HarnessConfig,
    executor: E,
    results: Vec<SuiteResult>,
}

impl SuiteRunner<ProcessExecutor> {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_executor(config, ProcessExecutor)
    }
}

impl<E: CommandExecutor> SuiteRunner<E> {
    pub fn with_executor(config: HarnessConfig, executor: E) -> Self {
        Self {
            config,
            executor,
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one suite kind (or all of them) and record the result(s).
    ///
    /// Unknown environments fail before anything runs. For `All`, each
    /// constituent is recorded and the summed aggregate is returned.
    pub async fn run_suite(
        &mut self,
        kind: SuiteKind,
        environment: &str,
        options: &SuiteOptions,
    ) -> Result<SuiteResult> {
        let env = self.config.environment(environment)?.clone();

        if kind != SuiteKind::All {
            let start = Instant::now();
            return match self.run_single(kind, environment, &env, options).await {
                Ok(result) => {
                    self.results.push(result.clone());
                    Ok(result)
                }
                Err(e) => {
                    error!(suite = %kind, error = %e, "Suite failed to run");
                    self.results
                        .push(SuiteResult::failure(kind, environment, start.elapsed()));
                    Err(e)
                }
            };
        }

        info!(environment, "Running all suites");
        let start = Instant::now();
        let mut aggregate = SuiteResult {
            suite: SuiteKind::All,
            environment: environment.to_string(),
            passed: 0,
            failed: 0,
            skipped: 0,
            duration: Duration::ZERO,
            coverage: None,
            performance_metrics: None,
            artifacts: Vec::new(),
        };

        for kind in SuiteKind::CONCRETE {
            let suite_start = Instant::now();
            let result = match self.run_single(kind, environment, &env, options).await {
                Ok(result) => result,
                Err(e) => {
                    error!(suite = %kind, error = %e, "Suite failed to run");
                    SuiteResult::failure(kind, environment, suite_start.elapsed())
                }
            };
            aggregate.passed = aggregate.passed.saturating_add(result.passed);
            aggregate.failed = aggregate.failed.saturating_add(result.failed);
            aggregate.skipped = aggregate.skipped.saturating_add(result.skipped);
            aggregate.artifacts.extend(result.artifacts.iter().cloned());
            self.results.push(result);
        }

        aggregate.duration = start.elapsed();
        info!(
            environment,
            passed = aggregate.passed,
            failed = aggregate.failed,
            skipped = aggregate.skipped,
            "All suites finished"
        );
        Ok(aggregate)
    }

    async fn run_single(
        &self,
        kind: SuiteKind,
        environment: &str,
        env: &EnvironmentConfig,
        options: &SuiteOptions,
    ) -> Result<SuiteResult> {
        let spec = self.command_for(kind, environment, env, options)?;
        info!(suite = %kind, environment, command = %spec, "Suite started");

        let start = Instant::now();
        let output = self.executor.execute(&spec).await?;
        let duration = start.elapsed();

        let parsed = if kind == SuiteKind::Load {
            parse_load_output(&output.stdout, &self.config.load)
        } else {
            parse_test_output(&output.stdout)
        };

        let result = match parsed {
            Ok(parsed) => SuiteResult {
                suite: kind,
                environment: environment.to_string(),
                passed: parsed.passed,
                failed: parsed.failed,
                skipped: parsed.skipped,
                duration,
                coverage: parsed.coverage,
                performance_metrics: parsed.performance,
                artifacts: parsed.artifacts,
            },
            Err(message) => {
                error!(
                    suite = %kind,
                    exit_code = ?output.exit_code,
                    stderr = %output.stderr.trim(),
                    "Could not parse suite output: {}",
                    message
                );
                SuiteResult::failure(kind, environment, duration)
            }
        };

        if result.failed > 0 {
            warn!(suite = %kind, passed = result.passed, failed = result.failed, "Suite finished with failures");
        } else {
            info!(suite = %kind, passed = result.passed, skipped = result.skipped, ?duration, "Suite passed");
        }
        Ok(result)
    }

    /// Resolve the configured command and the environment it runs with
    pub fn command_for(
        &self,
        kind: SuiteKind,
        environment: &str,
        env: &EnvironmentConfig,
        options: &SuiteOptions,
    ) -> Result<CommandSpec> {
        let command = self.config.suite_command(kind.as_str()).ok_or_else(|| {
            HarnessError::invalid_config(format!("no command configured for suite '{}'", kind))
        })?;

        let mut args = command.args.clone();
        if options.coverage {
            args.push("--coverage".to_string());
        }
        args.extend(options.extra_args.iter().cloned());

        let mut vars = BTreeMap::from([
            ("NODE_ENV".to_string(), "test".to_string()),
            ("DATABASE_URL".to_string(), env.database_url.clone()),
            ("BASE_URL".to_string(), env.base_url.clone()),
            ("TEST_ENV".to_string(), environment.to_string()),
        ]);
        if let Some(api_key) = &env.api_key {
            vars.insert("API_KEY".to_string(), api_key.clone());
        }
        for (flag, enabled) in &env.features {
            vars.insert(
                format!("FEATURE_{}", flag.to_ascii_uppercase()),
                enabled.to_string(),
            );
        }
        if kind == SuiteKind::Load {
            let load = &self.config.load;
            vars.insert("CONCURRENT_USERS".to_string(), load.concurrent_users.to_string());
            vars.insert("DURATION".to_string(), load.duration_secs.to_string());
            vars.insert("RAMP_UP".to_string(), load.ramp_up_secs.to_string());
        }

        Ok(CommandSpec {
            program: command.command.clone(),
            args,
            env: vars,
        })
    }

    /// Every result recorded so far, in run order
    pub fn results(&self) -> &[SuiteResult] {
        &self.results
    }

    pub fn summary(&self) -> SuiteSummary {
        let count = |field: fn(&SuiteResult) -> u32| {
            self.results
                .iter()
                .fold(0u32, |sum, r| sum.saturating_add(field(r)))
        };
        let passed = count(|r| r.passed);
        let failed = count(|r| r.failed);
        let skipped = count(|r| r.skipped);
        let total_tests = passed.saturating_add(failed).saturating_add(skipped);

        SuiteSummary {
            total_tests,
            passed,
            failed,
            skipped,
            success_rate: if total_tests == 0 {
                0.0
            } else {
                f64::from(passed) * 100.0 / f64::from(total_tests)
            },
            total_duration: self.results.iter().map(|r| r.duration).sum(),
            suite_count: self.results.len(),
        }
    }

    /// Write `test-report-<unix-ms>.json` with the summary and every result
    pub fn write_report<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let report = TestReport {
            generated_at: Utc::now(),
            summary: self.summary(),
            results: &self.results,
        };
        ReportWriter::new(dir).write_json("test-report", &report)
    }

    /// 1 if any recorded suite had a failure, else 0.
    ///
    /// A suite whose command could not be started is recorded as one failure.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.results.iter().any(|r| r.failed > 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Returns canned stdout per program and records every spec it sees
    #[derive(Default)]
    struct ScriptedExecutor {
        outputs: BTreeMap<String, String>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedExecutor {
        fn with(mut self, program: &str, stdout: &str) -> Self {
            self.outputs.insert(program.to_string(), stdout.to_string());
            self
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for ScriptedExecutor {
        async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            match self.outputs.get(&spec.program) {
                Some(stdout) => Ok(CommandOutput {
                    exit_code: Some(0),
                    stdout: stdout.clone(),
                    stderr: String::new(),
                }),
                None => Err(HarnessError::command_failed(spec.program.clone(), "not found".to_string())),
            }
        }
    }

    fn config() -> HarnessConfig {
        HarnessConfig::builder()
            .environment_config(
                "ci",
                EnvironmentConfig::new("http://app:3000", "postgres://db:5432/app_ci")
                    .with_api_key("k-123")
                    .with_feature("sso", true),
            )
            .suite(SuiteKind::Unit, "unit-tool", &["--json"])
            .suite(SuiteKind::Integration, "integration-tool", &[])
            .suite(SuiteKind::E2e, "e2e-tool", &[])
            .suite(SuiteKind::Load, "load-tool", &[])
            .suite(SuiteKind::Security, "security-tool", &[])
            .suite(SuiteKind::Accessibility, "a11y-tool", &[])
            .build()
            .unwrap()
    }

    const JEST_OK: &str = r#"{"numPassedTests":5,"numFailedTests":0,"numPendingTests":1}"#;

    #[tokio::test]
    async fn test_single_suite_injects_environment() {
        let executor = ScriptedExecutor::default().with("unit-tool", JEST_OK);
        let mut runner = SuiteRunner::with_executor(config(), executor);

        let options = SuiteOptions {
            coverage: true,
            ..Default::default()
        };
        let result = runner.run_suite(SuiteKind::Unit, "ci", &options).await.unwrap();
        assert_eq!((result.passed, result.failed, result.skipped), (5, 0, 1));
        assert_eq!(runner.results().len(), 1);
        assert_eq!(runner.exit_code(), 0);

        let call = &runner.executor.calls()[0];
        assert_eq!(call.args, vec!["--json".to_string(), "--coverage".to_string()]);
        assert_eq!(call.env["NODE_ENV"], "test");
        assert_eq!(call.env["BASE_URL"], "http://app:3000");
        assert_eq!(call.env["DATABASE_URL"], "postgres://db:5432/app_ci");
        assert_eq!(call.env["API_KEY"], "k-123");
        assert_eq!(call.env["TEST_ENV"], "ci");
        assert_eq!(call.env["FEATURE_SSO"], "true");
        assert!(!call.env.contains_key("CONCURRENT_USERS"));
    }

    #[tokio::test]
    async fn test_unknown_environment_runs_nothing() {
        let mut runner = SuiteRunner::with_executor(config(), ScriptedExecutor::default());
        let error = runner
            .run_suite(SuiteKind::Unit, "production", &SuiteOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(error, HarnessError::UnknownEnvironment { .. }));
        assert!(runner.executor.calls().is_empty());
        assert!(runner.results().is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_degrades_to_single_failure() {
        let executor = ScriptedExecutor::default().with("unit-tool", "Tests: 5 passed\n");
        let mut runner = SuiteRunner::with_executor(config(), executor);

        let result = runner
            .run_suite(SuiteKind::Unit, "ci", &SuiteOptions::default())
            .await
            .unwrap();
        assert_eq!((result.passed, result.failed), (0, 1));
        assert_eq!(runner.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_single_suite_command_error_propagates() {
        let mut runner = SuiteRunner::with_executor(config(), ScriptedExecutor::default());
        let error = runner
            .run_suite(SuiteKind::Security, "ci", &SuiteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error, HarnessError::CommandFailed { .. }));

        let recorded = runner.results();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].suite, SuiteKind::Security);
        assert_eq!((recorded[0].passed, recorded[0].failed), (0, 1));
        assert_eq!(runner.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_huge_tool_counts_saturate() {
        let huge = format!(r#"{{"passed":{},"failed":0}}"#, u32::MAX);
        let executor = ScriptedExecutor::default()
            .with("unit-tool", &huge)
            .with("integration-tool", &huge);
        let mut runner = SuiteRunner::with_executor(config(), executor);
        let options = SuiteOptions::default();
        runner.run_suite(SuiteKind::Unit, "ci", &options).await.unwrap();
        runner.run_suite(SuiteKind::Integration, "ci", &options).await.unwrap();

        let summary = runner.summary();
        assert_eq!(summary.passed, u32::MAX);
        assert_eq!(summary.total_tests, u32::MAX);
        assert_eq!(summary.success_rate, 100.0);
    }

    #[tokio::test]
    async fn test_repeated_reports_do_not_overwrite() {
        let executor = ScriptedExecutor::default().with("unit-tool", JEST_OK);
        let mut runner = SuiteRunner::with_executor(config(), executor);
        runner
            .run_suite(SuiteKind::Unit, "ci", &SuiteOptions::default())
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let first = runner.write_report(dir.path()).unwrap();
        let second = runner.write_report(dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_all_continues_past_failing_suite() {
        let executor = ScriptedExecutor::default()
            .with("unit-tool", JEST_OK)
            .with("integration-tool", r#"{"passed":3,"failed":1}"#)
            .with("e2e-tool", r#"{"stats":{"expected":2,"unexpected":0,"skipped":0}}"#)
            .with(
                "load-tool",
                r#"{"requests":100,"failures":0,"avgResponseMs":50,"p95ResponseMs":80,"p99ResponseMs":95,"requestsPerSecond":10}"#,
            )
            .with("a11y-tool", r#"{"passed":1,"failed":0}"#);
        let mut runner = SuiteRunner::with_executor(config(), executor);

        let aggregate = runner
            .run_suite(SuiteKind::All, "ci", &SuiteOptions::default())
            .await
            .unwrap();

        // security-tool is missing and counts as one failure
        assert_eq!(aggregate.suite, SuiteKind::All);
        assert_eq!(aggregate.passed, 5 + 3 + 2 + 2 + 1);
        assert_eq!(aggregate.failed, 1 + 1);
        assert_eq!(aggregate.skipped, 1);

        let kinds: Vec<SuiteKind> = runner.results().iter().map(|r| r.suite).collect();
        assert_eq!(kinds, SuiteKind::CONCRETE.to_vec());
        let security = &runner.results()[4];
        assert_eq!((security.passed, security.failed), (0, 1));

        let load = &runner.results()[3];
        assert!(load.performance_metrics.is_some());
        let load_call = &runner.executor.calls()[3];
        assert_eq!(load_call.env["CONCURRENT_USERS"], "10");
        assert_eq!(load_call.env["DURATION"], "60");
        assert_eq!(load_call.env["RAMP_UP"], "10");

        assert_eq!(runner.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_summary_and_report() {
        let executor = ScriptedExecutor::default()
            .with("unit-tool", JEST_OK)
            .with("integration-tool", r#"{"passed":3,"failed":1}"#);
        let mut runner = SuiteRunner::with_executor(config(), executor);
        let options = SuiteOptions::default();
        runner.run_suite(SuiteKind::Unit, "ci", &options).await.unwrap();
        runner.run_suite(SuiteKind::Integration, "ci", &options).await.unwrap();

        let summary = runner.summary();
        assert_eq!(summary.total_tests, 10);
        assert_eq!(summary.passed, 8);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.success_rate, 80.0);
        assert_eq!(summary.suite_count, 2);

        let dir = TempDir::new().unwrap();
        let path = runner.write_report(dir.path().join("reports")).unwrap();
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(report["summary"]["totalTests"], 10);
        assert_eq!(report["summary"]["suiteCount"], 2);
        assert_eq!(report["results"][1]["suite"], "integration");
        assert!(report["results"][0]["durationMs"].is_u64());
    }

    #[test]
    fn test_suite_kind_parsing() {
        assert_eq!("E2E".parse::<SuiteKind>().unwrap(), SuiteKind::E2e);
        assert_eq!("a11y".parse::<SuiteKind>().unwrap(), SuiteKind::Accessibility);
        assert!("smoke".parse::<SuiteKind>().is_err());
    }
}
