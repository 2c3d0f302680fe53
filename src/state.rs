use crate::config::{Config, StoreKind};
use crate::ledger::Ledger;
use crate::storage::{CsvFileStore, MemoryStore, RecordStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub roster: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, roster: Vec<String>) -> Self {
        Self {
            ledger: Ledger::new(store),
            roster: Arc::new(roster),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn RecordStore> = match &config.store {
            StoreKind::Csv(path) => Arc::new(CsvFileStore::new(path.clone())),
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        };
        Self::new(store, config.roster.clone())
    }
}
