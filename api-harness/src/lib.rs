//! API Harness - test orchestration for multi-tenant HTTP APIs
//!
//! This crate generates fixture records, feeds synthetic requests through
//! application handlers, runs role and tenant matrices, gates runs on service
//! health, executes named scenarios with guaranteed cleanup, and aggregates
//! external test-suite results into reports and an exit code.

// Core modules
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Test data and request plumbing
pub mod assertions;
pub mod fixtures;
pub mod invocation;
pub mod matrix;
pub mod store;

// Orchestration
pub mod health;
pub mod report;
pub mod scenario;
pub mod suite;

// Re-export main types for convenience
pub use config::{EnvironmentConfig, HarnessConfig, HarnessConfigBuilder};
pub use error::{AssertionFailure, HandlerError, HarnessError, Result};
pub use fixtures::{FixtureFactory, EnterpriseBusiness, MultiTenant, SmallBusiness};
pub use health::{HealthCheckResult, HealthChecker, ServiceHealthReport, ServiceKind};
pub use invocation::{call_authenticated, call_unauthenticated, invoke, InvokeOptions, Invoker};
pub use matrix::{test_role_access, test_tenant_isolation, RoleAccessReport, ALL_ROLES};
pub use scenario::{Scenario, ScenarioRunResult, ScenarioRunner};
pub use store::InMemoryStore;
pub use suite::{SuiteKind, SuiteOptions, SuiteResult, SuiteRunner, SuiteSummary};
pub use traits::{CommandExecutor, Handler, ReadinessProbe, TestDatabase};
pub use types::{
    ApiRequest, ApiResponse, HandlerOutput, Identity, InvocationResult, ResponseData, Role,
    Session,
};
