use crate::error::{HarnessError, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Identity roles exercised by the role matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    User,
    Viewer,
}

impl Role {
    /// Wire name of the role as the application sees it
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
            Role::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "USER" => Ok(Role::User),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(HarnessError::invalid_config(format!("Unknown role: {}", other))),
        }
    }
}

/// Authenticated user carried by a simulated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: String,
}

/// Simulated authentication session handed to a handler with each request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

/// Role and tenant a matrix run authenticates as
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub role: Role,
    pub tenant_id: String,
}

impl Identity {
    pub fn new<S: Into<String>>(role: Role, tenant_id: S) -> Self {
        Self {
            role,
            tenant_id: tenant_id.into(),
        }
    }
}

/// Synthetic request handed to a handler under test
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    /// Header names are lower-cased
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    /// Explicit authentication context; `None` means unauthenticated
    pub session: Option<Session>,
}

impl ApiRequest {
    /// Look up a header case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First value of a query parameter
    pub fn query(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Deserialize the JSON body, `None` when the request has no body
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.body {
            Some(body) => Ok(Some(serde_json::from_str(body)?)),
            None => Ok(None),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.user.role)
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.tenant_id.as_str())
    }
}

/// Response-like value returned by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    /// JSON response with the matching content type
    pub fn json(status: u16, value: &Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body: value.to_string(),
        }
    }

    /// Plain-text response
    pub fn text<S: Into<String>>(status: u16, body: S) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the declared content type is JSON (including `+json` suffixes)
    pub fn is_json(&self) -> bool {
        self.content_type()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}

/// What a handler produced: a full response, or a bare value from legacy handlers
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    Structured(ApiResponse),
    Raw(Value),
}

impl From<ApiResponse> for HandlerOutput {
    fn from(response: ApiResponse) -> Self {
        HandlerOutput::Structured(response)
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Raw(value)
    }
}

/// Decoded response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Json(Value),
    Text(String),
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            ResponseData::Json(_) => None,
        }
    }
}

/// Normalized `{status, headers, data}` record produced by the invocation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub data: ResponseData,
}

impl InvocationResult {
    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<&Value> {
        self.data.as_json()
    }

    /// Top-level field of a JSON object payload
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json().and_then(|value| value.get(name))
    }
}
