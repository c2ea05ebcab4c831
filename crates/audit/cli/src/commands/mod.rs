//! CLI command implementations

pub mod attest;
pub mod events;
pub mod provenance;

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::AppConfig;
    use crate::Context;
    use audit_ledger::Ledger;
    use audit_store::MemoryRecordStore;
    use std::sync::Arc;

    /// Context over an in-memory store, returned alongside the store
    pub fn context() -> (Context, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        let config = AppConfig::default();
        let ledger = Ledger::new(config.ledger.clone()).with_store(store.clone());
        (
            Context {
                config,
                ledger: Arc::new(ledger),
            },
            store,
        )
    }
}
