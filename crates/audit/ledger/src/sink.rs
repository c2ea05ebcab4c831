//! Sinks receiving a copy of every appended event

use crate::error::{LedgerError, LedgerResult};
use crate::event::AuditEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use std::time::Duration;

/// Trait for event sinks.
///
/// Delivery is fire-and-forget from the ledger's point of view: errors are
/// logged by the caller and never retried.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event
    async fn publish(&self, event: &AuditEvent) -> LedgerResult<()>;
}

/// Posts each event as JSON to a central collection endpoint
pub struct HttpEventSink {
    client: Client,
    endpoint: String,
}

impl HttpEventSink {
    /// Create a sink for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LedgerError::Sink(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn publish(&self, event: &AuditEvent) -> LedgerResult<()> {
        self.client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| LedgerError::Sink(e.to_string()))?;
        Ok(())
    }
}

/// In-memory sink for testing
#[derive(Default)]
pub struct MemoryEventSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all delivered events
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, event: &AuditEvent) -> LedgerResult<()> {
        self.events.write().push(event.clone());
        Ok(())
    }
}
