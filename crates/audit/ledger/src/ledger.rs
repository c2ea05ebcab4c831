use crate::config::LedgerConfig;
use crate::error::LedgerResult;
use crate::event::{AuditEvent, EventCategory, EventFields};
use crate::export::{self, ExportFormat};
use crate::integrity::{compute_event_hash, ChainHead, ChainVerification, IntegrityVerifier};
use crate::query::AuditQuery;
use crate::report::AnalyticsReport;
use crate::session::SessionActivity;
use crate::sink::{EventSink, HttpEventSink};
use audit_crypto::{HashPrimitive, Sha256Hash};
use audit_store::{RecordStore, AUDIT_LOG};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Append-only, hash-chained audit ledger.
///
/// Appends are serialized behind a single writer lock that is held across the
/// persistence write, so two concurrent callers can never both observe the
/// same chain tail. Reads (`query`, `verify`, exports) work on a snapshot and
/// never wait on I/O.
pub struct Ledger {
    config: LedgerConfig,
    hasher: Arc<dyn HashPrimitive>,
    store: Option<Arc<dyn RecordStore>>,
    sink: Option<Arc<dyn EventSink>>,
    events: RwLock<VecDeque<AuditEvent>>,
    sessions: RwLock<HashMap<String, SessionActivity>>,
    writer: Mutex<ChainHead>,
}

impl Ledger {
    /// Create an in-memory ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            hasher: Arc::new(Sha256Hash),
            store: None,
            sink: None,
            events: RwLock::new(VecDeque::new()),
            sessions: RwLock::new(HashMap::new()),
            writer: Mutex::new(ChainHead::new()),
        }
    }

    /// Create a ledger, wiring the HTTP sink when a central endpoint is configured.
    pub fn from_config(config: LedgerConfig) -> LedgerResult<Self> {
        let sink = match config.central_endpoint {
            Some(ref endpoint) => Some(Arc::new(HttpEventSink::new(endpoint.clone())?)),
            None => None,
        };
        let mut ledger = Self::new(config);
        if let Some(sink) = sink {
            ledger.sink = Some(sink);
        }
        Ok(ledger)
    }

    /// Open a ledger over an existing store and resume its chain.
    pub async fn open(
        config: LedgerConfig,
        store: Arc<dyn RecordStore>,
        sink: Option<Arc<dyn EventSink>>,
    ) -> LedgerResult<Self> {
        let mut ledger = Self::new(config).with_store(store);
        ledger.sink = sink;
        ledger.restore().await?;
        Ok(ledger)
    }

    /// Persist events through the given store.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Forward events to the given sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the digest primitive.
    pub fn with_hasher(mut self, hasher: Arc<dyn HashPrimitive>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Ledger configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Digest primitive shared with collaborators that log through this ledger
    pub fn hasher(&self) -> Arc<dyn HashPrimitive> {
        Arc::clone(&self.hasher)
    }

    /// Persistence collaborator, if any
    pub fn store(&self) -> Option<Arc<dyn RecordStore>> {
        self.store.clone()
    }

    /// Reload the in-memory sequence from the store and resume the chain at
    /// its tail. Records that fail to decode are skipped with a warning; an
    /// unreadable store leaves the ledger empty.
    pub async fn restore(&self) -> LedgerResult<usize> {
        let Some(store) = self.store.clone() else {
            return Ok(0);
        };

        let mut head = self.writer.lock().await;
        let records = match store.scan(AUDIT_LOG).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read stored audit events; starting an empty chain");
                Vec::new()
            }
        };

        let mut loaded = VecDeque::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<AuditEvent>(record) {
                Ok(event) => loaded.push_back(event),
                Err(e) => warn!(error = %e, "skipping undecodable audit record"),
            }
        }
        let sequence = loaded.len() as u64;
        while loaded.len() > self.config.max_log_size {
            loaded.pop_front();
        }

        let sessions = sessions_of(&loaded);

        *head = ChainHead::from_state(loaded.back().and_then(|e| e.hash.clone()), sequence);
        let count = loaded.len();
        *self.events.write() = loaded;
        *self.sessions.write() = sessions;

        info!(events = count, "audit ledger restored from store");
        Ok(count)
    }

    /// Append an event to the chain.
    ///
    /// Persistence failures are logged and swallowed; the event stays in the
    /// in-memory ledger. Sink delivery runs on a spawned task, so a slow
    /// endpoint never delays the caller. Hashing failures propagate.
    /// Must be called within a tokio runtime.
    pub async fn append(
        &self,
        category: EventCategory,
        fields: EventFields,
    ) -> LedgerResult<AuditEvent> {
        let mut head = self.writer.lock().await;

        let timestamp = Utc::now();
        let event_id = format!(
            "evt_{}_{:06}",
            timestamp.timestamp_millis(),
            head.next_sequence()
        );
        let mut event = fields.into_event(event_id, category, timestamp);

        if self.config.enable_crypto_verification {
            event.hash = Some(compute_event_hash(self.hasher.as_ref(), &event)?);
            event.previous_hash = head.previous_hash();
        }

        head.advance(&event);
        let evicted = {
            let mut events = self.events.write();
            events.push_back(event.clone());
            let mut evicted = Vec::new();
            while events.len() > self.config.max_log_size {
                evicted.extend(events.pop_front());
            }
            evicted
        };
        if event.session_id.is_some() || !evicted.is_empty() {
            let mut sessions = self.sessions.write();
            track_session(&mut sessions, &event);
            for old in &evicted {
                forget_session(&mut sessions, old);
            }
        }

        self.persist(&event).await;
        drop(head);

        debug!(
            event_id = %event.event_id,
            category = %event.category,
            event_type = %event.event_type,
            "audit event appended"
        );

        if let Some(ref sink) = self.sink {
            let sink = Arc::clone(sink);
            let delivered = event.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.publish(&delivered).await {
                    warn!(event_id = %delivered.event_id, error = %e, "central endpoint delivery failed");
                }
            });
        }

        Ok(event)
    }

    async fn persist(&self, event: &AuditEvent) {
        let Some(ref store) = self.store else {
            return;
        };

        let record = match serde_json::to_value(event) {
            Ok(record) => record,
            Err(e) => {
                warn!(event_id = %event.event_id, error = %e, "failed to encode audit event for storage");
                return;
            }
        };

        if let Err(e) = store.put(AUDIT_LOG, &event.event_id, record).await {
            warn!(
                event_id = %event.event_id,
                error = %e,
                "failed to persist audit event; continuing in degraded durability mode"
            );
        }
    }

    /// Verify every hash and every link of the retained chain.
    pub fn verify(&self) -> LedgerResult<ChainVerification> {
        let events = self.events();
        if !self.config.enable_crypto_verification {
            return Ok(ChainVerification {
                verified: true,
                total_events: events.len(),
                errors: Vec::new(),
                message: Some("Crypto verification not enabled".to_string()),
            });
        }

        let result = IntegrityVerifier::verify_chain(self.hasher.as_ref(), &events)?;
        if !result.verified {
            warn!(
                total_events = result.total_events,
                failures = result.errors.len(),
                "audit chain verification failed"
            );
        }
        Ok(result)
    }

    /// Events matching `query`, in append order
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditEvent> {
        query.apply(self.events.read().iter())
    }

    /// Snapshot of the retained events
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// The last `limit` events
    pub fn recent_events(&self, limit: usize) -> Vec<AuditEvent> {
        let events = self.events.read();
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Hash of the most recently retained event
    pub fn last_event_hash(&self) -> Option<String> {
        self.events.read().back().and_then(|e| e.hash.clone())
    }

    /// Export filtered events
    pub fn export(&self, format: ExportFormat, query: &AuditQuery) -> LedgerResult<String> {
        export::render(&self.query(query), format)
    }

    /// Aggregate filtered events
    pub fn analytics_report(&self, query: &AuditQuery) -> AnalyticsReport {
        AnalyticsReport::from_events(&self.query(query))
    }

    /// Activity summary of one session
    pub fn session_activity(&self, session_id: &str) -> Option<SessionActivity> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Activity summaries of all sessions
    pub fn session_activities(&self) -> Vec<SessionActivity> {
        self.sessions.read().values().cloned().collect()
    }

    /// Drop events older than the retention period from memory and storage.
    pub async fn enforce_retention_policy(&self) -> LedgerResult<usize> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.config.retention_days));
        self.prune_before(cutoff).await
    }

    /// Drop events with a timestamp strictly before `cutoff`.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> LedgerResult<usize> {
        let mut head = self.writer.lock().await;

        let removed_in_memory = {
            let mut events = self.events.write();
            let before = events.len();
            events.retain(|e| e.timestamp >= cutoff);
            *self.sessions.write() = sessions_of(&events);
            before - events.len()
        };

        let mut removed_from_store = 0;
        if let Some(ref store) = self.store {
            match store.scan(AUDIT_LOG).await {
                Ok(records) => {
                    let expired: Vec<String> = records
                        .into_iter()
                        .filter_map(|record| serde_json::from_value::<AuditEvent>(record).ok())
                        .filter(|event| event.timestamp < cutoff)
                        .map(|event| event.event_id)
                        .collect();
                    if !expired.is_empty() {
                        match store.remove_many(AUDIT_LOG, &expired).await {
                            Ok(removed) => removed_from_store = removed,
                            Err(e) => warn!(error = %e, "failed to prune stored audit events"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "failed to scan stored audit events for retention"),
            }
        }

        head.reset_tail(self.last_event_hash());

        info!(
            cutoff = %cutoff,
            removed_in_memory,
            removed_from_store,
            "retention policy enforced"
        );
        Ok(removed_in_memory.max(removed_from_store))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

fn sessions_of(events: &VecDeque<AuditEvent>) -> HashMap<String, SessionActivity> {
    let mut sessions = HashMap::new();
    for event in events {
        track_session(&mut sessions, event);
    }
    sessions
}

fn forget_session(sessions: &mut HashMap<String, SessionActivity>, event: &AuditEvent) {
    let Some(ref session_id) = event.session_id else {
        return;
    };
    if sessions
        .get_mut(session_id)
        .is_some_and(|activity| activity.forget_oldest())
    {
        sessions.remove(session_id);
    }
}

fn track_session(sessions: &mut HashMap<String, SessionActivity>, event: &AuditEvent) {
    let Some(ref session_id) = event.session_id else {
        return;
    };
    sessions
        .entry(session_id.clone())
        .or_insert_with(|| SessionActivity::new(session_id.clone(), event.timestamp))
        .record(event);
}
