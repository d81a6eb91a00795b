//! In-memory implementation of the persistence collaborator.

use crate::error::{HarnessError, Result};
use crate::traits::{ReadinessProbe, TestDatabase};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

type Collections = HashMap<String, Vec<Value>>;

/// Collections of JSON records keyed by name, shared between clones
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    collections: Arc<Mutex<Collections>>,
    healthy: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flip the readiness reported by `is_healthy`
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|_| HarnessError::store("store lock poisoned"))
    }

    /// Snapshot of a collection, optionally restricted to one tenant
    pub fn records(&self, collection: &str, tenant_id: Option<&str>) -> Result<Vec<Value>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        tenant_id.is_none()
                            || item.get("tenantId").and_then(Value::as_str) == tenant_id
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn record_id(record: &Value) -> Option<String> {
        match record.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl TestDatabase for InMemoryStore {
    async fn setup(&self) -> Result<()> {
        self.lock()?.clear();
        debug!("In-memory store ready");
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        let mut collections = self.lock()?;
        let removed: usize = collections.values().map(Vec::len).sum();
        collections.clear();
        debug!(removed, "In-memory store cleaned");
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn create_many(&self, collection: &str, records: Vec<Value>) -> Result<Vec<Value>> {
        let mut collections = self.lock()?;
        let existing: HashSet<String> = collections
            .get(collection)
            .map(|items| items.iter().filter_map(Self::record_id).collect())
            .unwrap_or_default();

        // Validate the whole batch before touching the collection
        let mut batch_ids = HashSet::new();
        let mut prepared = Vec::with_capacity(records.len());
        for mut record in records {
            let Some(object) = record.as_object_mut() else {
                return Err(HarnessError::store(format!(
                    "records in '{}' must be JSON objects",
                    collection
                )));
            };
            if !object.contains_key("id") {
                object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            let id = Self::record_id(&record).unwrap_or_default();
            if existing.contains(&id) || !batch_ids.insert(id.clone()) {
                return Err(HarnessError::store(format!(
                    "duplicate id '{}' in '{}'",
                    id, collection
                )));
            }
            prepared.push(record);
        }

        collections
            .entry(collection.to_string())
            .or_default()
            .extend(prepared.iter().cloned());
        Ok(prepared)
    }

    async fn count(&self, collection: &str, tenant_id: Option<&str>) -> Result<usize> {
        let collections = self.lock()?;
        let Some(items) = collections.get(collection) else {
            return Ok(0);
        };
        Ok(match tenant_id {
            Some(tenant_id) => items
                .iter()
                .filter(|item| item.get("tenantId").and_then(Value::as_str) == Some(tenant_id))
                .count(),
            None => items.len(),
        })
    }

    async fn find(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.lock()?;
        Ok(collections.get(collection).and_then(|items| {
            items
                .iter()
                .find(|item| Self::record_id(item).as_deref() == Some(id))
                .cloned()
        }))
    }
}

/// Readiness probe backed by a store's `is_healthy`
pub struct StoreProbe<D> {
    database: Arc<D>,
}

impl<D: TestDatabase> StoreProbe<D> {
    pub fn new(database: Arc<D>) -> Self {
        Self { database }
    }
}

impl<D: TestDatabase + 'static> ReadinessProbe for StoreProbe<D> {
    fn probe(&self) -> BoxFuture<'_, std::result::Result<Option<Value>, String>> {
        Box::pin(async move {
            if self.database.is_healthy().await {
                Ok(None)
            } else {
                Err("database reported unhealthy".to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_count_find() {
        let store = InMemoryStore::new();
        store.setup().await.unwrap();

        let created = store
            .create_many(
                "customers",
                vec![
                    json!({"id": "c1", "tenantId": "t1"}),
                    json!({"id": "c2", "tenantId": "t2"}),
                    json!({"tenantId": "t1"}),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        assert!(created[2].get("id").is_some());
        assert_eq!(store.count("customers", None).await.unwrap(), 3);
        assert_eq!(store.count("customers", Some("t1")).await.unwrap(), 2);
        assert_eq!(store.count("deals", None).await.unwrap(), 0);
        assert_eq!(store.records("customers", Some("t2")).unwrap().len(), 1);
        assert_eq!(
            store.find("customers", "c2").await.unwrap(),
            Some(json!({"id": "c2", "tenantId": "t2"}))
        );
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let store = InMemoryStore::new();
        store
            .create_many("deals", vec![json!({"id": "d1"})])
            .await
            .unwrap();

        let result = store
            .create_many("deals", vec![json!({"id": "d2"}), json!({"id": "d1"})])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count("deals", None).await.unwrap(), 1);

        assert!(store.create_many("deals", vec![json!(5)]).await.is_err());

        store.cleanup().await.unwrap();
        assert_eq!(store.count("deals", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_probe_follows_health() {
        let store = Arc::new(InMemoryStore::new());
        let probe = StoreProbe::new(store.clone());
        assert!(probe.probe().await.is_ok());

        store.set_healthy(false);
        assert_eq!(
            probe.probe().await,
            Err("database reported unhealthy".to_string())
        );
    }
}
