use crate::StoreResult;
use async_trait::async_trait;
use serde_json::Value;

/// Ordered key-value store used by the ledger and the provenance graph.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace `record` under `key`.
    async fn put(&self, collection: &str, key: &str, record: Value) -> StoreResult<()>;

    /// Read one record.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>>;

    /// All records of a collection in insertion order.
    async fn scan(&self, collection: &str) -> StoreResult<Vec<Value>>;

    /// Delete a record, returning whether it existed.
    async fn remove(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Delete several records, returning how many existed.
    async fn remove_many(&self, collection: &str, keys: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.remove(collection, key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
