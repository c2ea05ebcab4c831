//! In-memory reference implementation of [`RecordStore`].
//!
//! Deterministic and test-friendly; nothing survives the process.

use crate::traits::RecordStore;
use crate::StoreResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Insertion-ordered records of one collection.
#[derive(Debug, Default, Clone)]
pub(crate) struct Collection {
    order: Vec<String>,
    records: HashMap<String, Value>,
}

impl Collection {
    pub(crate) fn put(&mut self, key: &str, record: Value) {
        if self.records.insert(key.to_string(), record).is_none() {
            self.order.push(key.to_string());
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.records.get(key).cloned()
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        if self.records.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    /// Remove every key in `keys`, returning how many existed.
    pub(crate) fn remove_many(&mut self, keys: &[String]) -> usize {
        let before = self.records.len();
        for key in keys {
            self.records.remove(key);
        }
        let records = &self.records;
        self.order.retain(|k| records.contains_key(k));
        before - self.records.len()
    }

    /// Entries in insertion order
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key).map(|record| (key.as_str(), record)))
    }

    pub(crate) fn values(&self) -> Vec<Value> {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key).cloned())
            .collect()
    }
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.records.len())
            .unwrap_or(0)
    }

    /// Whether a collection is empty or missing.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, collection: &str, key: &str, record: Value) -> StoreResult<()> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .put(key, record);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(key)))
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(Collection::values)
            .unwrap_or_default())
    }

    async fn remove(&self, collection: &str, key: &str) -> StoreResult<bool> {
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .is_some_and(|c| c.remove(key)))
    }

    async fn remove_many(&self, collection: &str, keys: &[String]) -> StoreResult<usize> {
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .map_or(0, |c| c.remove_many(keys)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn scan_preserves_insertion_order() {
        let store = MemoryRecordStore::new();
        store.put("c", "b", json!(2)).await.unwrap();
        store.put("c", "a", json!(1)).await.unwrap();
        store.put("c", "z", json!(3)).await.unwrap();

        assert_eq!(
            store.scan("c").await.unwrap(),
            vec![json!(2), json!(1), json!(3)]
        );
    }

    #[tokio::test]
    async fn replacing_a_key_keeps_its_position() {
        let store = MemoryRecordStore::new();
        store.put("c", "a", json!("old")).await.unwrap();
        store.put("c", "b", json!("other")).await.unwrap();
        store.put("c", "a", json!("new")).await.unwrap();

        assert_eq!(store.len("c"), 2);
        assert_eq!(
            store.scan("c").await.unwrap(),
            vec![json!("new"), json!("other")]
        );
        assert_eq!(store.get("c", "a").await.unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryRecordStore::new();
        store.put("left", "k", json!(1)).await.unwrap();

        assert_eq!(store.get("right", "k").await.unwrap(), None);
        assert!(store.scan("right").await.unwrap().is_empty());
        assert!(store.is_empty("right"));
    }

    #[tokio::test]
    async fn remove_reports_existence() {
        let store = MemoryRecordStore::new();
        store.put("c", "k", json!(1)).await.unwrap();

        assert!(store.remove("c", "k").await.unwrap());
        assert!(!store.remove("c", "k").await.unwrap());
        assert!(store.scan("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_many_counts_existing_keys() {
        let store = MemoryRecordStore::new();
        for key in ["a", "b", "c"] {
            store.put("c", key, json!(key)).await.unwrap();
        }

        let removed = store
            .remove_many("c", &["a".to_string(), "c".to_string(), "zz".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.scan("c").await.unwrap(), vec![json!("b")]);
        assert_eq!(store.remove_many("missing", &["a".to_string()]).await.unwrap(), 0);
    }
}
