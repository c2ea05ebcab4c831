//! JSON-lines file store with append-only writes.
//!
//! Each collection is a log file `<dir>/<collection>.jsonl`. A `put` appends
//! the new value, a `remove` appends a tombstone, and reads replay the log
//! (last write wins, first position kept). `remove_many` rewrites the log
//! without the removed keys instead of appending tombstones.
//!
//! Lines that do not decode (a write torn by a crash) are skipped on replay
//! and dropped by the next compaction.

use crate::memory::Collection;
use crate::traits::RecordStore;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum LogLine {
    Put { key: String, record: Value },
    Remove { key: String },
}

/// File-backed record store.
pub struct FileRecordStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "file record store opened");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> StoreResult<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }
        Ok(self.dir.join(format!("{collection}.jsonl")))
    }

    async fn append(&self, collection: &str, line: &LogLine) -> StoreResult<()> {
        let path = self.collection_path(collection)?;
        let json = serde_json::to_string(line)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await?;

        // A torn final line would swallow this record; start a fresh line.
        if file.metadata().await?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                file.write_all(b"\n").await?;
            }
        }

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }

    async fn replay(&self, collection: &str) -> StoreResult<Collection> {
        let path = self.collection_path(collection)?;
        let mut state = Collection::default();
        if !tokio::fs::try_exists(&path).await? {
            return Ok(state);
        }

        let file = File::open(&path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogLine>(&line) {
                Ok(LogLine::Put { key, record }) => state.put(&key, record),
                Ok(LogLine::Remove { key }) => {
                    state.remove(&key);
                }
                Err(e) => warn!(
                    collection,
                    line = line_no,
                    error = %e,
                    "skipping undecodable store line"
                ),
            }
        }
        Ok(state)
    }

    /// Replace the log with one `put` line per live record.
    async fn compact(&self, collection: &str, state: &Collection) -> StoreResult<()> {
        let path = self.collection_path(collection)?;
        let staging = self.dir.join(format!("{collection}.jsonl.tmp"));

        let mut buf = String::new();
        for (key, record) in state.entries() {
            buf.push_str(&serde_json::to_string(&LogLine::Put {
                key: key.to_string(),
                record: record.clone(),
            })?);
            buf.push('\n');
        }

        let mut file = File::create(&staging).await?;
        file.write_all(buf.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn put(&self, collection: &str, key: &str, record: Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.append(
            collection,
            &LogLine::Put {
                key: key.to_string(),
                record,
            },
        )
        .await
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.replay(collection).await?.get(key))
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self.replay(collection).await?.values())
    }

    async fn remove(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.replay(collection).await?.get(key).is_none() {
            return Ok(false);
        }
        self.append(
            collection,
            &LogLine::Remove {
                key: key.to_string(),
            },
        )
        .await?;
        Ok(true)
    }

    async fn remove_many(&self, collection: &str, keys: &[String]) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.replay(collection).await?;
        let removed = state.remove_many(keys);
        if removed > 0 {
            self.compact(collection, &state).await?;
            debug!(collection, removed, "collection compacted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();

        {
            let store = FileRecordStore::open(temp_dir.path()).await.unwrap();
            store.put("audit_log", "e1", json!({"n": 1})).await.unwrap();
            store.put("audit_log", "e2", json!({"n": 2})).await.unwrap();
        }

        let store = FileRecordStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(
            store.scan("audit_log").await.unwrap(),
            vec![json!({"n": 1}), json!({"n": 2})]
        );
        assert_eq!(
            store.get("audit_log", "e2").await.unwrap(),
            Some(json!({"n": 2}))
        );
    }

    #[tokio::test]
    async fn put_replaces_and_remove_tombstones() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).await.unwrap();

        store.put("provenance", "a", json!("v1")).await.unwrap();
        store.put("provenance", "b", json!("v1")).await.unwrap();
        store.put("provenance", "a", json!("v2")).await.unwrap();
        assert!(store.remove("provenance", "b").await.unwrap());
        assert!(!store.remove("provenance", "missing").await.unwrap());

        assert_eq!(store.scan("provenance").await.unwrap(), vec![json!("v2")]);
    }

    #[tokio::test]
    async fn missing_collection_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(temp_dir.path().join("nested")).await.unwrap();

        assert!(store.scan("audit_log").await.unwrap().is_empty());
        assert_eq!(store.get("audit_log", "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_path_like_collection_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).await.unwrap();

        let result = store.put("../escape", "k", json!(1)).await;
        assert!(matches!(result, Err(StoreError::InvalidCollection(_))));
    }

    #[tokio::test]
    async fn torn_tail_is_skipped_and_next_write_starts_a_new_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).await.unwrap();
        store.put("audit_log", "e1", json!({"n": 1})).await.unwrap();
        store.put("audit_log", "e2", json!({"n": 2})).await.unwrap();

        let path = temp_dir.path().join("audit_log.jsonl");
        let mut file = OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(br#"{"op":"put","key":"evt_1"#).await.unwrap();
        drop(file);

        let reopened = FileRecordStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(
            reopened.scan("audit_log").await.unwrap(),
            vec![json!({"n": 1}), json!({"n": 2})]
        );

        reopened.put("audit_log", "e3", json!({"n": 3})).await.unwrap();
        assert_eq!(reopened.scan("audit_log").await.unwrap().len(), 3);
        assert_eq!(
            reopened.get("audit_log", "e3").await.unwrap(),
            Some(json!({"n": 3}))
        );
    }

    #[tokio::test]
    async fn remove_many_compacts_the_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(temp_dir.path()).await.unwrap();
        let keys: Vec<String> = (0..50).map(|i| format!("k{i}")).collect();
        for key in &keys {
            store.put("audit_log", key, json!({"key": key})).await.unwrap();
        }
        store.put("audit_log", "keep", json!("kept")).await.unwrap();

        let path = temp_dir.path().join("audit_log.jsonl");
        let before = tokio::fs::metadata(&path).await.unwrap().len();

        assert_eq!(store.remove_many("audit_log", &keys).await.unwrap(), 50);
        let after = tokio::fs::metadata(&path).await.unwrap().len();
        assert!(after < before / 10, "before={before} after={after}");
        assert_eq!(store.scan("audit_log").await.unwrap(), vec![json!("kept")]);
        assert!(!temp_dir.path().join("audit_log.jsonl.tmp").exists());

        assert_eq!(store.remove_many("audit_log", &keys).await.unwrap(), 0);
    }
}
