use crate::error::ProvenanceResult;
use crate::record::{CanonicalRecord, Lineage, Operation, ProvenanceInput, ProvenanceRecord};
use crate::tree::{self, ProvenanceNode};
use audit_crypto::generate_id;
use audit_ledger::{EventCategory, EventFields, Ledger};
use audit_store::{RecordStore, PROVENANCE};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A record together with its full provenance tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceView {
    #[serde(flatten)]
    pub record: ProvenanceRecord,
    pub full_lineage: Option<ProvenanceNode>,
}

/// Keyed provenance graph, one record per data id.
///
/// Every recorded operation is also written to the audit ledger as a
/// `data_provenance` event so lineage changes are covered by the hash chain.
pub struct ProvenanceGraph {
    ledger: Arc<Ledger>,
    store: Option<Arc<dyn RecordStore>>,
    records: RwLock<HashMap<String, ProvenanceRecord>>,
}

impl ProvenanceGraph {
    /// Create a graph that logs through `ledger` and persists to the ledger's store.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        let store = ledger.store();
        Self {
            ledger,
            store,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Persist records through a different store.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Load persisted records. Undecodable entries are skipped.
    pub async fn restore(&self) -> ProvenanceResult<usize> {
        let Some(ref store) = self.store else {
            return Ok(0);
        };

        let records = match store.scan(PROVENANCE).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read provenance records; starting empty");
                return Ok(0);
            }
        };

        let mut loaded = HashMap::new();
        for value in records {
            match serde_json::from_value::<ProvenanceRecord>(value) {
                Ok(record) => {
                    loaded.insert(record.data_id.clone(), record);
                }
                Err(e) => warn!(error = %e, "skipping undecodable provenance record"),
            }
        }

        let count = loaded.len();
        *self.records.write() = loaded;
        info!(records = count, "provenance graph restored from store");
        Ok(count)
    }

    /// Record how `data_id` was produced, replacing any earlier record for it.
    pub async fn record(
        &self,
        data_id: &str,
        operation: Operation,
        input: ProvenanceInput,
    ) -> ProvenanceResult<ProvenanceRecord> {
        let timestamp = Utc::now();
        let lineage = self.build_lineage(data_id, &input.parent_data_ids);

        let mut record = ProvenanceRecord {
            provenance_id: generate_id("prov"),
            data_id: data_id.to_string(),
            operation,
            timestamp,
            timestamp_ms: audit_crypto::timestamp_millis(&timestamp),
            user_id: input.user_id,
            session_id: input.session_id,
            parent_data_ids: input.parent_data_ids,
            transformations: input.transformations,
            computation_hash: input.computation_hash,
            metadata: input.metadata.unwrap_or_else(|| json!({})),
            lineage,
            hash: None,
        };

        let config = self.ledger.config();
        if config.enable_crypto_verification {
            let canonical = serde_json::to_string(&CanonicalRecord::of(&record))?;
            record.hash = Some(self.ledger.hasher().digest_str(&canonical));
        }

        if !config.enable_provenance_tracking {
            debug!(data_id, "provenance tracking disabled; record not retained");
            return Ok(record);
        }

        self.records
            .write()
            .insert(record.data_id.clone(), record.clone());

        let value = serde_json::to_value(&record)?;
        if let Some(ref store) = self.store {
            if let Err(e) = store.put(PROVENANCE, data_id, value.clone()).await {
                warn!(data_id, error = %e, "failed to persist provenance record");
            }
        }

        self.ledger
            .append(
                EventCategory::Data,
                EventFields::new("data_provenance")
                    .action(operation.as_str())
                    .resource(data_id)
                    .maybe_user(record.user_id.clone())
                    .maybe_session(record.session_id.clone())
                    .metadata(value),
            )
            .await?;

        debug!(
            data_id,
            operation = %operation,
            depth = record.lineage.depth,
            "provenance recorded"
        );
        Ok(record)
    }

    fn build_lineage(&self, data_id: &str, parents: &[String]) -> Lineage {
        let records = self.records.read();
        let mut lineage = Lineage::root(data_id);
        for parent in parents.iter().filter_map(|id| records.get(id)) {
            lineage.absorb(parent);
        }
        lineage
    }

    /// Current record for `data_id`
    pub fn get(&self, data_id: &str) -> Option<ProvenanceRecord> {
        self.records.read().get(data_id).cloned()
    }

    /// Provenance tree rooted at `data_id`, or `None` if it is not registered.
    pub fn tree(&self, data_id: &str) -> Option<ProvenanceNode> {
        tree::build(&self.records.read(), data_id, &mut HashSet::new())
    }

    /// Record plus full provenance tree
    pub fn query(&self, data_id: &str) -> Option<ProvenanceView> {
        let records = self.records.read();
        let record = records.get(data_id)?.clone();
        let full_lineage = tree::build(&records, data_id, &mut HashSet::new());
        Some(ProvenanceView {
            record,
            full_lineage,
        })
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
