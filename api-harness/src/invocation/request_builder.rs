use super::InvokeOptions;
use crate::error::Result;
use crate::types::ApiRequest;
use std::collections::HashMap;
use url::Url;

/// Build the synthetic request a handler receives
///
/// Caller headers are merged over `content-type: application/json`, query
/// parameters are appended in order, and a JSON body is serialized.
pub fn build_request(base_url: &Url, options: &InvokeOptions) -> Result<ApiRequest> {
    let mut url = base_url.join(&options.path)?;
    if !options.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &options.query {
            pairs.append_pair(key, value);
        }
    }

    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    for (key, value) in &options.headers {
        headers.insert(key.to_ascii_lowercase(), value.clone());
    }

    let body = options
        .body
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(ApiRequest {
        method: options.method.clone(),
        url,
        headers,
        body,
        session: options.session.clone(),
    })
}
