use crate::error::{HarnessError, Result};
use crate::types::{HandlerOutput, InvocationResult, ResponseData};
use serde_json::Value;
use std::collections::HashMap;

/// Normalize handler output into `{status, headers, data}`
pub fn convert_output(output: HandlerOutput) -> Result<InvocationResult> {
    match output {
        HandlerOutput::Structured(response) => {
            let data = if response.is_json() {
                if response.body.trim().is_empty() {
                    ResponseData::Json(Value::Null)
                } else {
                    let value = serde_json::from_str(&response.body).map_err(|e| {
                        HarnessError::InvalidResponseBody {
                            message: e.to_string(),
                        }
                    })?;
                    ResponseData::Json(value)
                }
            } else {
                ResponseData::Text(response.body)
            };

            let headers = response
                .headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect();

            Ok(InvocationResult {
                status: response.status,
                headers,
                data,
            })
        }
        // Legacy handlers return the payload itself
        HandlerOutput::Raw(value) => Ok(InvocationResult {
            status: 200,
            headers: HashMap::new(),
            data: ResponseData::Json(value),
        }),
    }
}
