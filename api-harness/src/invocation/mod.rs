//! Request invocation layer: feeds synthetic requests through a handler.

pub mod request_builder;
pub mod response_converter;

pub use request_builder::build_request;
pub use response_converter::convert_output;

use crate::error::{HarnessError, Result};
use crate::fixtures::session_for;
use crate::traits::Handler;
use crate::types::{Identity, InvocationResult, Session};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Origin synthetic request URLs are built against
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Everything needed to build one synthetic request
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub session: Option<Session>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/api/test".to_string(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
            session: None,
        }
    }
}

impl InvokeOptions {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post<S: Into<String>>(path: S, body: Value) -> Self {
        Self::new(Method::POST, path).body(body)
    }

    pub fn put<S: Into<String>>(path: S, body: Value) -> Self {
        Self::new(Method::PUT, path).body(body)
    }

    pub fn delete<S: Into<String>>(path: S) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn without_session(mut self) -> Self {
        self.session = None;
        self
    }
}

/// Feeds synthetic requests through handlers against a fixed origin
#[derive(Debug, Clone)]
pub struct Invoker {
    base_url: Url,
}

impl Invoker {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request from `options`, run the handler, normalize its output.
    ///
    /// Handler errors propagate unchanged as [`HarnessError::Handler`].
    pub async fn invoke<H: Handler>(
        &self,
        handler: &H,
        options: InvokeOptions,
    ) -> Result<InvocationResult> {
        let request = build_request(&self.base_url, &options)?;
        debug!(
            method = %request.method,
            url = %request.url,
            authenticated = request.session.is_some(),
            "Invoking handler"
        );

        let output = handler
            .handle(request)
            .await
            .map_err(HarnessError::Handler)?;

        let result = convert_output(output)?;
        debug!(status = result.status, "Handler returned");
        Ok(result)
    }

    /// Invoke with a session built for `identity`
    pub async fn call_authenticated<H: Handler>(
        &self,
        handler: &H,
        identity: &Identity,
        options: InvokeOptions,
    ) -> Result<InvocationResult> {
        self.invoke(handler, options.session(session_for(identity)))
            .await
    }

    /// Invoke with no session at all
    pub async fn call_unauthenticated<H: Handler>(
        &self,
        handler: &H,
        options: InvokeOptions,
    ) -> Result<InvocationResult> {
        self.invoke(handler, options.without_session()).await
    }
}

impl Default for Invoker {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

/// [`Invoker::invoke`] against the default origin
pub async fn invoke<H: Handler>(handler: &H, options: InvokeOptions) -> Result<InvocationResult> {
    Invoker::default().invoke(handler, options).await
}

/// [`Invoker::call_authenticated`] against the default origin
pub async fn call_authenticated<H: Handler>(
    handler: &H,
    identity: &Identity,
    options: InvokeOptions,
) -> Result<InvocationResult> {
    Invoker::default()
        .call_authenticated(handler, identity, options)
        .await
}

/// [`Invoker::call_unauthenticated`] against the default origin
pub async fn call_unauthenticated<H: Handler>(
    handler: &H,
    options: InvokeOptions,
) -> Result<InvocationResult> {
    Invoker::default()
        .call_unauthenticated(handler, options)
        .await
}
