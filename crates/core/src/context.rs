use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mutable key/value store shared by every action of a single run.
///
/// Cloning yields another handle to the same store; a fresh store is created
/// for each run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    inner: Arc<RwLock<Map<String, Value>>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().await.get(key).cloned()
    }

    /// Store a value, returning the previous one
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().await.insert(key.into(), value.into())
    }

    /// Serialize and store any value
    pub async fn insert_serialized<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Option<Value>> {
        let value = serde_json::to_value(value)?;
        Ok(self.inner.write().await.insert(key.into(), value))
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().await.remove(key)
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Apply `f` to the store while holding the write lock
    pub async fn update<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }

    /// Copy of the current contents
    pub async fn snapshot(&self) -> Map<String, Value> {
        self.inner.read().await.clone()
    }

    /// True when both handles point at the same store
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
