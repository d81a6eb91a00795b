//! Predicates over captured responses.
//!
//! Each returns `Err(AssertionFailure)` describing the first mismatch, so they
//! chain with `?` inside scenario steps.

use crate::error::AssertionFailure;
use crate::types::InvocationResult;
use serde_json::Value;

type Check = std::result::Result<(), AssertionFailure>;

pub fn assert_status(result: &InvocationResult, expected: u16) -> Check {
    if result.status == expected {
        Ok(())
    } else {
        Err(AssertionFailure::Status {
            expected,
            actual: result.status,
        })
    }
}

fn json_body(result: &InvocationResult) -> std::result::Result<&Value, AssertionFailure> {
    result.json().ok_or_else(|| AssertionFailure::NotJson {
        body: result.data.as_text().unwrap_or_default().to_string(),
    })
}

fn require_field<'a>(value: &'a Value, field: &str) -> std::result::Result<&'a Value, AssertionFailure> {
    value.get(field).ok_or_else(|| AssertionFailure::MissingField {
        field: field.to_string(),
    })
}

/// 200 with a JSON body
pub fn assert_success(result: &InvocationResult) -> Check {
    assert_status(result, 200)?;
    json_body(result).map(|_| ())
}

/// 201 with the created record's `id`
pub fn assert_created(result: &InvocationResult) -> Check {
    assert_status(result, 201)?;
    require_field(json_body(result)?, "id").map(|_| ())
}

/// 200 with `{data: [...], pagination: {page, limit, total, totalPages}}`
pub fn assert_paginated(result: &InvocationResult) -> Check {
    assert_status(result, 200)?;
    let body = json_body(result)?;

    if !require_field(body, "data")?.is_array() {
        return Err(AssertionFailure::Shape {
            field: "data".to_string(),
            message: "expected an array".to_string(),
        });
    }

    let pagination = require_field(body, "pagination")?;
    for key in ["page", "limit", "total", "totalPages"] {
        if !require_field(pagination, key)?.is_number() {
            return Err(AssertionFailure::Shape {
                field: format!("pagination.{}", key),
                message: "expected a number".to_string(),
            });
        }
    }
    Ok(())
}

/// 400 with an `error` message; when `field` is given it must appear in `details`
pub fn assert_validation_error(result: &InvocationResult, field: Option<&str>) -> Check {
    assert_status(result, 400)?;
    let body = json_body(result)?;
    require_field(body, "error")?;

    if let Some(field) = field {
        let details = require_field(body, "details")?;
        let mentioned = match details {
            Value::Object(map) => map.contains_key(field),
            Value::Array(items) => items.iter().any(|item| {
                item.get("field").and_then(Value::as_str) == Some(field)
                    || item.get("path").and_then(Value::as_array).is_some_and(|path| {
                        path.iter().any(|p| p.as_str() == Some(field))
                    })
            }),
            _ => false,
        };
        if !mentioned {
            return Err(AssertionFailure::Shape {
                field: "details".to_string(),
                message: format!("no validation detail for '{}'", field),
            });
        }
    }
    Ok(())
}

pub fn assert_unauthorized(result: &InvocationResult) -> Check {
    assert_status(result, 401)
}

pub fn assert_forbidden(result: &InvocationResult) -> Check {
    assert_status(result, 403)
}

pub fn assert_not_found(result: &InvocationResult) -> Check {
    assert_status(result, 404)
}

/// Every listed field is present on the JSON object body
pub fn assert_has_fields(result: &InvocationResult, fields: &[&str]) -> Check {
    let body = json_body(result)?;
    for field in fields {
        require_field(body, field)?;
    }
    Ok(())
}

/// Items of a list payload: the body itself or its `data` array
fn list_items(body: &Value) -> std::result::Result<&Vec<Value>, AssertionFailure> {
    body.as_array()
        .or_else(|| body.get("data").and_then(Value::as_array))
        .ok_or_else(|| AssertionFailure::Shape {
            field: "data".to_string(),
            message: "expected a list payload".to_string(),
        })
}

/// Every item in the list payload carries `tenantId == tenant_id`
pub fn assert_tenant_scoped(result: &InvocationResult, tenant_id: &str) -> Check {
    let items = list_items(json_body(result)?)?;
    for (index, item) in items.iter().enumerate() {
        let actual = item
            .get("tenantId")
            .and_then(Value::as_str)
            .unwrap_or("<missing>");
        if actual != tenant_id {
            return Err(AssertionFailure::TenantLeak {
                index,
                expected: tenant_id.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

/// `id` values of the list payload, in order
pub fn list_ids(result: &InvocationResult) -> Vec<String> {
    result
        .json()
        .and_then(|body| list_items(body).ok())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id"))
                .map(|id| match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
