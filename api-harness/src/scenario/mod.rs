//! Named end-to-end pipelines with guaranteed cleanup.

mod environment;
mod pipeline;

pub use environment::{setup_environment, teardown_environment};
pub use pipeline::{Scenario, ScenarioPhase, ScenarioRunResult};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use pipeline::ErasedScenario;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Per-step deadline applied when none is configured
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(300);

/// Results of [`ScenarioRunner::run_all_scenarios`], in registration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioBatchReport {
    pub results: Vec<ScenarioRunResult>,
    pub passed: usize,
}

impl ScenarioBatchReport {
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.results.len()
    }
}

pub struct ScenarioRunner {
    scenarios: Vec<(String, Box<dyn ErasedScenario>)>,
    step_timeout: Option<Duration>,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
            step_timeout: Some(DEFAULT_STEP_TIMEOUT),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new().with_step_timeout(config.scenarios.step_timeout())
    }

    /// Deadline for each of setup, execute, verify and cleanup; `None` waits forever
    #[must_use]
    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn register<N: Into<String>, S: Scenario>(&mut self, name: N, scenario: S) -> Result<()> {
        let name = name.into();
        if self.scenarios.iter().any(|(existing, _)| *existing == name) {
            return Err(HarnessError::DuplicateScenario { scenario: name });
        }
        self.scenarios.push((name, Box::new(scenario)));
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Run one scenario; failures inside it are reported in the result, not returned
    pub async fn run_scenario(&self, name: &str) -> Result<ScenarioRunResult> {
        let (name, scenario) = self
            .scenarios
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| HarnessError::UnknownScenario {
                scenario: name.to_string(),
            })?;
        Ok(scenario.run(name, self.step_timeout).await)
    }

    /// Run everything sequentially, continuing past failures
    pub async fn run_all_scenarios(&self) -> ScenarioBatchReport {
        let mut results = Vec::with_capacity(self.scenarios.len());
        for (name, scenario) in &self.scenarios {
            results.push(scenario.run(name, self.step_timeout).await);
        }

        let passed = results.iter().filter(|r| r.success).count();
        info!(
            total = results.len(),
            passed,
            failed = results.len() - passed,
            "Scenario batch finished"
        );
        ScenarioBatchReport { results, passed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssertionFailure, HandlerError};
    use serde::Serialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Serialize)]
    struct Counter {
        count: u32,
    }

    struct CountScenario;

    impl Scenario for CountScenario {
        type Context = Counter;
        type Output = Counter;

        async fn setup(&self) -> std::result::Result<Counter, HandlerError> {
            Ok(Counter { count: 0 })
        }

        async fn execute(&self, context: &mut Counter) -> std::result::Result<Counter, HandlerError> {
            context.count += 1;
            Ok(Counter {
                count: context.count,
            })
        }

        async fn verify(
            &self,
            context: &Counter,
            _output: &Counter,
        ) -> std::result::Result<(), HandlerError> {
            if context.count == 1 {
                Ok(())
            } else {
                Err(AssertionFailure::custom(format!("count was {}", context.count)).into())
            }
        }
    }

    #[derive(Clone, Copy)]
    enum FailAt {
        Execute,
        Verify,
        Never,
    }

    struct Flagged {
        fail_at: FailAt,
        cleaned: Arc<AtomicBool>,
        fail_cleanup: bool,
    }

    impl Flagged {
        fn new(fail_at: FailAt) -> (Self, Arc<AtomicBool>) {
            let cleaned = Arc::new(AtomicBool::new(false));
            let scenario = Self {
                fail_at,
                cleaned: cleaned.clone(),
                fail_cleanup: false,
            };
            (scenario, cleaned)
        }
    }

    impl Scenario for Flagged {
        type Context = String;
        type Output = ();

        async fn setup(&self) -> std::result::Result<String, HandlerError> {
            Ok("ctx".to_string())
        }

        async fn execute(&self, _context: &mut String) -> std::result::Result<(), HandlerError> {
            match self.fail_at {
                FailAt::Execute => Err("execute blew up".into()),
                _ => Ok(()),
            }
        }

        async fn verify(&self, _context: &String, _output: &()) -> std::result::Result<(), HandlerError> {
            match self.fail_at {
                FailAt::Verify => Err("verify blew up".into()),
                _ => Ok(()),
            }
        }

        async fn cleanup(&self, _context: String) -> std::result::Result<(), HandlerError> {
            self.cleaned.store(true, Ordering::SeqCst);
            if self.fail_cleanup {
                Err("cleanup blew up".into())
            } else {
                Ok(())
            }
        }
    }

    struct Hangs;

    impl Scenario for Hangs {
        type Context = ();
        type Output = ();

        async fn setup(&self) -> std::result::Result<(), HandlerError> {
            Ok(())
        }

        async fn execute(&self, _context: &mut ()) -> std::result::Result<(), HandlerError> {
            futures::future::pending::<()>().await;
            Ok(())
        }

        async fn verify(&self, _context: &(), _output: &()) -> std::result::Result<(), HandlerError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_count_scenario() {
        let mut runner = ScenarioRunner::new();
        runner.register("count", CountScenario).unwrap();

        let result = runner.run_scenario("count").await.unwrap();
        assert!(result.success);
        assert_eq!(result.result, Some(json!({"count": 1})));
        assert_eq!(result.context, Some(json!({"count": 1})));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_runs_when_execute_or_verify_fails() {
        for (fail_at, phase) in [
            (FailAt::Execute, ScenarioPhase::Executing),
            (FailAt::Verify, ScenarioPhase::Verifying),
        ] {
            let (scenario, cleaned) = Flagged::new(fail_at);
            let mut runner = ScenarioRunner::new();
            runner.register("flagged", scenario).unwrap();

            let result = runner.run_scenario("flagged").await.unwrap();
            assert!(!result.success);
            assert_eq!(result.failed_phase, Some(phase));
            assert_eq!(result.context, Some(json!("ctx")));
            assert!(cleaned.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn test_cleanup_failure_keeps_verdict() {
        let (mut scenario, cleaned) = Flagged::new(FailAt::Never);
        scenario.fail_cleanup = true;
        let mut runner = ScenarioRunner::new();
        runner.register("flagged", scenario).unwrap();

        let result = runner.run_scenario("flagged").await.unwrap();
        assert!(result.success);
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unknown_and_duplicate_names() {
        let mut runner = ScenarioRunner::new();
        runner.register("count", CountScenario).unwrap();

        assert!(matches!(
            runner.register("count", CountScenario),
            Err(HarnessError::DuplicateScenario { .. })
        ));
        assert!(matches!(
            runner.run_scenario("missing").await,
            Err(HarnessError::UnknownScenario { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_step_times_out() {
        let mut runner = ScenarioRunner::new().with_step_timeout(Some(Duration::from_secs(5)));
        runner.register("hangs", Hangs).unwrap();
        runner.register("count", CountScenario).unwrap();

        let report = runner.run_all_scenarios().await;
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed(), 1);

        let hung = &report.results[0];
        assert_eq!(hung.name, "hangs");
        assert_eq!(hung.failed_phase, Some(ScenarioPhase::Executing));
        assert!(hung.error.as_deref().unwrap().contains("timed out"));
        assert!(hung.duration >= Duration::from_secs(5));
    }
}
