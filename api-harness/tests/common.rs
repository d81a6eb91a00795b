//! Shared helpers for api-harness integration tests
#![allow(dead_code)]

use api_harness::error::HandlerError;
use api_harness::fixtures::Customer;
use api_harness::store::InMemoryStore;
use api_harness::traits::{Handler, TestDatabase};
use api_harness::types::{ApiRequest, ApiResponse, HandlerOutput, Role};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a test-writer subscriber; repeated calls are no-ops
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer().with_target(true))
        .with(filter)
        .try_init();
}

pub fn to_values<T: Serialize>(records: &[T]) -> Vec<Value> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).unwrap())
        .collect()
}

pub async fn seed_customers(store: &InMemoryStore, customers: &[Customer]) -> Vec<Value> {
    store
        .create_many("customers", to_values(customers))
        .await
        .unwrap()
}

/// Tenant-scoped customers endpoint backed by the in-memory store.
///
/// GET lists the caller's tenant (every role); POST creates (admins and managers).
pub fn customers_api(store: InMemoryStore) -> impl Handler {
    move |request: ApiRequest| customers_endpoint(store.clone(), request)
}

async fn customers_endpoint(
    store: InMemoryStore,
    request: ApiRequest,
) -> Result<HandlerOutput, HandlerError> {
    let (Some(role), Some(tenant_id)) = (request.role(), request.tenant_id().map(str::to_string))
    else {
        return Ok(ApiResponse::json(401, &json!({"error": "Unauthorized"})).into());
    };

    if request.method == Method::GET {
        let data = store.records("customers", Some(&tenant_id))?;
        let total = data.len();
        return Ok(ApiResponse::json(
            200,
            &json!({
                "data": data,
                "pagination": {"page": 1, "limit": 50, "total": total, "totalPages": 1}
            }),
        )
        .into());
    }

    if request.method == Method::POST {
        if !matches!(role, Role::Admin | Role::Manager) {
            return Ok(ApiResponse::json(403, &json!({"error": "Forbidden"})).into());
        }
        let body: Value = request.json()?.unwrap_or(Value::Null);
        let missing: Vec<Value> = ["name", "email"]
            .iter()
            .filter(|field| body.get(**field).and_then(Value::as_str).is_none())
            .map(|field| json!({"field": field, "message": "Required"}))
            .collect();
        if !missing.is_empty() {
            return Ok(ApiResponse::json(
                400,
                &json!({"error": "Validation failed", "details": missing}),
            )
            .into());
        }

        let mut record = body;
        record["tenantId"] = json!(tenant_id);
        let created = store.create_many("customers", vec![record]).await?;
        return Ok(ApiResponse::json(201, &created[0]).into());
    }

    Ok(ApiResponse::json(405, &json!({"error": "Method not allowed"})).into())
}
