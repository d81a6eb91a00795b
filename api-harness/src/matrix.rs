//! Matrix tests: one request per role, or one per tenant.

use crate::assertions::list_ids;
use crate::error::{AssertionFailure, Result};
use crate::fixtures::{FixtureFactory, Tenant, TenantPatch};
use crate::invocation::{InvokeOptions, Invoker};
use crate::traits::Handler;
use crate::types::{Identity, InvocationResult, ResponseData, Role};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, warn};

/// Identity set of the role matrix, in execution order
pub const ALL_ROLES: [Role; 4] = [Role::Admin, Role::Manager, Role::User, Role::Viewer];

/// Outcome of one role's request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleOutcome {
    pub role: Role,
    /// The handler returned (whatever the status); `false` when it errored
    pub success: bool,
    pub status: Option<u16>,
    pub data: Option<ResponseData>,
    pub error: Option<String>,
}

/// One outcome per role in [`ALL_ROLES`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleAccessReport {
    pub outcomes: Vec<RoleOutcome>,
}

impl RoleAccessReport {
    pub fn get(&self, role: Role) -> Option<&RoleOutcome> {
        self.outcomes.iter().find(|o| o.role == role)
    }

    /// `(role, success, status)` per role, for comparing runs
    pub fn pattern(&self) -> Vec<(Role, bool, Option<u16>)> {
        self.outcomes
            .iter()
            .map(|o| (o.role, o.success, o.status))
            .collect()
    }

    /// Deviations from: allowed roles get 200/201, every other role gets 401/403
    pub fn violations(&self, allowed: &[Role]) -> Vec<String> {
        let mut violations = Vec::new();
        for role in ALL_ROLES {
            let Some(outcome) = self.get(role) else {
                violations.push(format!("{} has no outcome", role));
                continue;
            };

            let expected: &[u16] = if allowed.contains(&role) {
                &[200, 201]
            } else {
                &[401, 403]
            };

            match (outcome.status, &outcome.error) {
                (Some(status), _) if expected.contains(&status) => {}
                (Some(status), _) => violations.push(format!(
                    "{} expected {:?}, got {}",
                    role, expected, status
                )),
                (None, error) => violations.push(format!(
                    "{} expected {:?}, handler failed: {}",
                    role,
                    expected,
                    error.as_deref().unwrap_or("unknown error")
                )),
            }
        }
        violations
    }

    pub fn verify(&self, allowed: &[Role]) -> std::result::Result<(), AssertionFailure> {
        let violations = self.violations(allowed);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AssertionFailure::RoleMatrix { violations })
        }
    }
}

/// One tenant's side of an isolation run
#[derive(Debug, Clone)]
pub struct TenantProbe<T> {
    pub tenant: Tenant,
    pub data: T,
    pub result: InvocationResult,
}

/// Both tenants' data and results; isolation policy is left to the caller
#[derive(Debug, Clone)]
pub struct TenantIsolationReport<T> {
    pub first: TenantProbe<T>,
    pub second: TenantProbe<T>,
}

impl<T> TenantIsolationReport<T> {
    /// Record ids that appear in both tenants' list responses
    pub fn shared_ids(&self) -> Vec<String> {
        let first: HashSet<String> = list_ids(&self.first.result).into_iter().collect();
        list_ids(&self.second.result)
            .into_iter()
            .filter(|id| first.contains(id))
            .collect()
    }
}

impl Invoker {
    /// Run `options` once per role, sequentially, as `tenant_id`.
    ///
    /// Handler errors are recorded on the role's outcome instead of propagating,
    /// so the report always has every role.
    pub async fn run_role_matrix<H: Handler>(
        &self,
        handler: &H,
        options: &InvokeOptions,
        tenant_id: &str,
    ) -> RoleAccessReport {
        let mut outcomes = Vec::with_capacity(ALL_ROLES.len());

        for role in ALL_ROLES {
            let identity = Identity::new(role, tenant_id);
            let outcome = match self
                .call_authenticated(handler, &identity, options.clone())
                .await
            {
                Ok(result) => {
                    debug!(%role, status = result.status, "Role matrix request completed");
                    RoleOutcome {
                        role,
                        success: true,
                        status: Some(result.status),
                        data: Some(result.data),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(%role, error = %e, "Role matrix request failed");
                    RoleOutcome {
                        role,
                        success: false,
                        status: None,
                        data: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        RoleAccessReport { outcomes }
    }

    /// Run the role matrix and fail unless exactly the `allowed` roles get through
    pub async fn test_role_access<H: Handler>(
        &self,
        handler: &H,
        allowed: &[Role],
        options: &InvokeOptions,
        tenant_id: &str,
    ) -> Result<RoleAccessReport> {
        let report = self.run_role_matrix(handler, options, tenant_id).await;
        report.verify(allowed)?;
        info!(
            path = %options.path,
            allowed = ?allowed,
            "Role matrix matched expectations"
        );
        Ok(report)
    }

    /// Create two tenants with their own data and request `options` as each tenant's admin
    pub async fn test_tenant_isolation<H, F, Fut, T>(
        &self,
        handler: &H,
        factory: &mut FixtureFactory,
        mut create_data: F,
        options: &InvokeOptions,
    ) -> Result<TenantIsolationReport<T>>
    where
        H: Handler,
        F: FnMut(Tenant) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let first_tenant = factory.tenant(TenantPatch::default());
        let mut second_tenant = factory.tenant(TenantPatch::default());
        while second_tenant.id == first_tenant.id {
            second_tenant = factory.tenant(TenantPatch::default());
        }

        let first_data = create_data(first_tenant.clone()).await?;
        let second_data = create_data(second_tenant.clone()).await?;

        let first = self
            .probe_tenant(handler, first_tenant, first_data, options)
            .await?;
        let second = self
            .probe_tenant(handler, second_tenant, second_data, options)
            .await?;

        Ok(TenantIsolationReport { first, second })
    }

    async fn probe_tenant<H: Handler, T>(
        &self,
        handler: &H,
        tenant: Tenant,
        data: T,
        options: &InvokeOptions,
    ) -> Result<TenantProbe<T>> {
        let identity = Identity::new(Role::Admin, tenant.id.to_string());
        let result = self
            .call_authenticated(handler, &identity, options.clone())
            .await?;
        debug!(tenant = %tenant.id, status = result.status, "Tenant probe completed");
        Ok(TenantProbe {
            tenant,
            data,
            result,
        })
    }
}

/// [`Invoker::run_role_matrix`] against the default origin
pub async fn run_role_matrix<H: Handler>(
    handler: &H,
    options: &InvokeOptions,
    tenant_id: &str,
) -> RoleAccessReport {
    Invoker::default()
        .run_role_matrix(handler, options, tenant_id)
        .await
}

/// [`Invoker::test_role_access`] against the default origin
pub async fn test_role_access<H: Handler>(
    handler: &H,
    allowed: &[Role],
    options: &InvokeOptions,
    tenant_id: &str,
) -> Result<RoleAccessReport> {
    Invoker::default()
        .test_role_access(handler, allowed, options, tenant_id)
        .await
}

/// [`Invoker::test_tenant_isolation`] against the default origin
pub async fn test_tenant_isolation<H, F, Fut, T>(
    handler: &H,
    factory: &mut FixtureFactory,
    create_data: F,
    options: &InvokeOptions,
) -> Result<TenantIsolationReport<T>>
where
    H: Handler,
    F: FnMut(Tenant) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    Invoker::default()
        .test_tenant_isolation(handler, factory, create_data, options)
        .await
}
