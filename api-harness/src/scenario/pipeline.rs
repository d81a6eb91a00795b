use crate::error::HandlerError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// A named `{setup, execute, verify, cleanup}` pipeline
///
/// `cleanup` runs whenever `setup` produced a context, whatever happened after.
pub trait Scenario: Send + Sync + 'static {
    type Context: Serialize + Send + Sync;
    type Output: Serialize + Send + Sync;

    fn setup(&self) -> impl Future<Output = Result<Self::Context, HandlerError>> + Send;

    fn execute(
        &self,
        context: &mut Self::Context,
    ) -> impl Future<Output = Result<Self::Output, HandlerError>> + Send;

    fn verify(
        &self,
        context: &Self::Context,
        output: &Self::Output,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;

    fn cleanup(
        &self,
        context: Self::Context,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send {
        drop(context);
        async { Ok(()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioPhase {
    Pending,
    Setup,
    Executing,
    Verifying,
    Success,
    Failed,
    Cleanup,
    Done,
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioPhase::Pending => "PENDING",
            ScenarioPhase::Setup => "SETUP",
            ScenarioPhase::Executing => "EXECUTING",
            ScenarioPhase::Verifying => "VERIFYING",
            ScenarioPhase::Success => "SUCCESS",
            ScenarioPhase::Failed => "FAILED",
            ScenarioPhase::Cleanup => "CLEANUP",
            ScenarioPhase::Done => "DONE",
        };
        f.write_str(name)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Outcome of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRunResult {
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Setup through verify; cleanup is not counted
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Present whenever setup completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<ScenarioPhase>,
}

/// Object-safe view of a [`Scenario`] so runners can store mixed types
pub(crate) trait ErasedScenario: Send + Sync {
    fn run<'a>(
        &'a self,
        name: &'a str,
        step_timeout: Option<Duration>,
    ) -> BoxFuture<'a, ScenarioRunResult>;
}

impl<S: Scenario> ErasedScenario for S {
    fn run<'a>(
        &'a self,
        name: &'a str,
        step_timeout: Option<Duration>,
    ) -> BoxFuture<'a, ScenarioRunResult> {
        Box::pin(run_pipeline(self, name, step_timeout))
    }
}

/// Await one step under the optional deadline, flattening errors to text
async fn step<T, F>(phase: ScenarioPhase, limit: Option<Duration>, future: F) -> Result<T, String>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    let outcome = match limit {
        Some(limit) => match tokio::time::timeout(limit, future).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(format!("{} timed out after {:?}", phase, limit)),
        },
        None => future.await,
    };
    outcome.map_err(|e| e.to_string())
}

fn snapshot<T: Serialize>(name: &str, what: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(scenario = name, error = %e, "Could not serialize scenario {}", what);
            None
        }
    }
}

async fn run_pipeline<S: Scenario>(
    scenario: &S,
    name: &str,
    step_timeout: Option<Duration>,
) -> ScenarioRunResult {
    let start = Instant::now();
    info!(scenario = name, phase = %ScenarioPhase::Setup, "Scenario started");

    let mut context = match step(ScenarioPhase::Setup, step_timeout, scenario.setup()).await {
        Ok(context) => context,
        Err(error) => {
            warn!(scenario = name, phase = %ScenarioPhase::Failed, %error, "Setup failed");
            return ScenarioRunResult {
                name: name.to_string(),
                success: false,
                result: None,
                error: Some(error),
                duration: start.elapsed(),
                context: None,
                failed_phase: Some(ScenarioPhase::Setup),
            };
        }
    };

    info!(scenario = name, phase = %ScenarioPhase::Executing);
    let outcome = match step(
        ScenarioPhase::Executing,
        step_timeout,
        scenario.execute(&mut context),
    )
    .await
    {
        Ok(output) => {
            info!(scenario = name, phase = %ScenarioPhase::Verifying);
            match step(
                ScenarioPhase::Verifying,
                step_timeout,
                scenario.verify(&context, &output),
            )
            .await
            {
                Ok(()) => Ok(output),
                Err(error) => Err((ScenarioPhase::Verifying, error)),
            }
        }
        Err(error) => Err((ScenarioPhase::Executing, error)),
    };
    let duration = start.elapsed();

    let context_snapshot = snapshot(name, "context", &context);
    let mut result = ScenarioRunResult {
        name: name.to_string(),
        success: false,
        result: None,
        error: None,
        duration,
        context: context_snapshot,
        failed_phase: None,
    };
    match outcome {
        Ok(output) => {
            info!(scenario = name, phase = %ScenarioPhase::Success, ?duration);
            result.success = true;
            result.result = snapshot(name, "output", &output);
        }
        Err((phase, error)) => {
            warn!(scenario = name, phase = %ScenarioPhase::Failed, failed_in = %phase, %error);
            result.error = Some(error);
            result.failed_phase = Some(phase);
        }
    }

    info!(scenario = name, phase = %ScenarioPhase::Cleanup);
    if let Err(error) = step(ScenarioPhase::Cleanup, step_timeout, scenario.cleanup(context)).await {
        warn!(scenario = name, %error, "Cleanup failed; verdict unchanged");
    }
    info!(scenario = name, phase = %ScenarioPhase::Done, success = result.success);

    result
}
