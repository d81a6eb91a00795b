//! Service health checks and the blocking "wait until healthy" gate.

use crate::config::{HarnessConfig, ServiceEntry};
use crate::error::{HarnessError, Result};
use crate::traits::ReadinessProbe;
use reqwest::Client;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Delay between polls in [`HealthChecker::wait_for_services`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Database,
    Cache,
    Http,
}

impl ServiceKind {
    /// Guess the kind from the service name or URL scheme
    pub fn infer(name: &str, url: &str) -> Self {
        let scheme = url.split("://").next().unwrap_or("").to_ascii_lowercase();
        match (name.to_ascii_lowercase().as_str(), scheme.as_str()) {
            ("database" | "db", _) | (_, "postgres" | "postgresql" | "mysql") => {
                ServiceKind::Database
            }
            ("cache" | "redis", _) | (_, "redis" | "rediss") => ServiceKind::Cache,
            _ => ServiceKind::Http,
        }
    }

    fn default_port(self) -> u16 {
        match self {
            ServiceKind::Database => 5432,
            ServiceKind::Cache => 6379,
            ServiceKind::Http => 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub url: String,
    pub timeout: Duration,
    pub kind: ServiceKind,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Outcome of one service check; `response_time` is set on every path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub healthy: bool,
    #[serde(rename = "responseTimeMs", serialize_with = "serialize_millis")]
    pub response_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// Per-service results in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceHealthReport {
    entries: Vec<(String, HealthCheckResult)>,
}

impl ServiceHealthReport {
    pub fn get(&self, name: &str) -> Option<&HealthCheckResult> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, result)| result)
    }

    pub fn all_healthy(&self) -> bool {
        self.entries.iter().all(|(_, result)| result.healthy)
    }

    pub fn unhealthy(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, result)| !result.healthy)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HealthCheckResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ServiceHealthReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

/// Registry of named dependencies polled before tests run
pub struct HealthChecker {
    client: Client,
    services: Vec<(String, ServiceConfig)>,
    probes: HashMap<String, Arc<dyn ReadinessProbe>>,
    poll_interval: Duration,
}

impl HealthChecker {
    /// Empty checker
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            services: Vec::new(),
            probes: HashMap::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Checker preloaded with the configured services
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let mut checker = Self::new()?;
        for (name, entry) in &config.services {
            checker.add_service_config(name, entry.to_service_config(name));
        }
        Ok(checker)
    }

    /// Override the delay between polls
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Register a service, inferring its kind; replaces an existing entry in place
    pub fn add_service<S: Into<String>>(&mut self, name: S, url: S, timeout: Duration) {
        let name = name.into();
        let url = url.into();
        let kind = ServiceKind::infer(&name, &url);
        self.add_service_config(&name, ServiceConfig { url, timeout, kind });
    }

    pub fn add_service_config(&mut self, name: &str, config: ServiceConfig) {
        match self.services.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = config,
            None => self.services.push((name.to_string(), config)),
        }
    }

    /// Use `probe` instead of a TCP connect for a database or cache service
    pub fn register_probe<S: Into<String>>(&mut self, name: S, probe: Arc<dyn ReadinessProbe>) {
        self.probes.insert(name.into(), probe);
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Check one service; unknown names fail before any I/O
    pub async fn check_service(&self, name: &str) -> Result<HealthCheckResult> {
        let config = self
            .services
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, config)| config)
            .ok_or_else(|| HarnessError::UnknownService {
                service: name.to_string(),
            })?;

        let start = Instant::now();
        let (healthy, error, response) = match config.kind {
            ServiceKind::Database | ServiceKind::Cache => self.check_with_probe(name, config).await,
            ServiceKind::Http => self.check_http(config).await,
        };
        let response_time = start.elapsed();

        debug!(service = name, healthy, ?response_time, "Service checked");
        Ok(HealthCheckResult {
            healthy,
            response_time,
            error,
            response,
        })
    }

    async fn check_with_probe(
        &self,
        name: &str,
        config: &ServiceConfig,
    ) -> (bool, Option<String>, Option<Value>) {
        let outcome = match self.probes.get(name) {
            Some(probe) => tokio::time::timeout(config.timeout, probe.probe()).await,
            None => tokio::time::timeout(config.timeout, tcp_probe(config)).await,
        };

        match outcome {
            Ok(Ok(response)) => (true, None, response),
            Ok(Err(error)) => (false, Some(error), None),
            Err(_) => (false, Some(timeout_message(config.timeout)), None),
        }
    }

    async fn check_http(&self, config: &ServiceConfig) -> (bool, Option<String>, Option<Value>) {
        let request = async {
            let response = self.client.get(&config.url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(config.timeout, request).await {
            Ok(Ok((status, body))) => {
                let payload = if body.is_empty() {
                    None
                } else {
                    Some(serde_json::from_str(&body).unwrap_or(Value::String(body)))
                };
                if status.is_success() {
                    (true, None, payload)
                } else {
                    (false, Some(format!("HTTP {}", status.as_u16())), payload)
                }
            }
            Ok(Err(e)) => (false, Some(e.to_string()), None),
            Err(_) => (false, Some(timeout_message(config.timeout)), None),
        }
    }

    /// Check every service sequentially, in registration order
    pub async fn check_all_services(&self) -> ServiceHealthReport {
        let mut entries = Vec::with_capacity(self.services.len());
        for (name, _) in &self.services {
            // Names come from the registry itself, so the lookup cannot miss
            if let Ok(result) = self.check_service(name).await {
                entries.push((name.clone(), result));
            }
        }
        ServiceHealthReport { entries }
    }

    /// Poll until every service is healthy (`true`) or `max_wait` has elapsed (`false`)
    pub async fn wait_for_services(&self, max_wait: Duration) -> bool {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let report = self.check_all_services().await;
            if report.all_healthy() {
                info!(attempt, elapsed = ?start.elapsed(), "All services healthy");
                return true;
            }

            let elapsed = start.elapsed();
            if elapsed >= max_wait {
                warn!(
                    attempt,
                    unhealthy = ?report.unhealthy(),
                    "Services did not become healthy within {:?}",
                    max_wait
                );
                return false;
            }

            info!(
                attempt,
                waiting_on = ?report.unhealthy(),
                "Services not ready, retrying"
            );
            tokio::time::sleep(self.poll_interval.min(max_wait - elapsed)).await;
        }
    }
}

impl ServiceEntry {
    fn to_service_config(&self, name: &str) -> ServiceConfig {
        ServiceConfig {
            url: self.url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            kind: self
                .kind
                .unwrap_or_else(|| ServiceKind::infer(name, &self.url)),
        }
    }
}

fn timeout_message(timeout: Duration) -> String {
    format!("timed out after {}ms", timeout.as_millis())
}

/// Default readiness check: open a TCP connection to the service's host and port
async fn tcp_probe(config: &ServiceConfig) -> std::result::Result<Option<Value>, String> {
    let url = Url::parse(&config.url).map_err(|e| format!("invalid url '{}': {}", config.url, e))?;
    let host = url
        .host_str()
        .ok_or_else(|| format!("url '{}' has no host", config.url))?
        .to_string();
    let port = url
        .port_or_known_default()
        .unwrap_or_else(|| config.kind.default_port());

    TcpStream::connect((host.as_str(), port))
        .await
        .map(|_| None)
        .map_err(|e| format!("connect to {}:{} failed: {}", host, port, e))
}
