pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod stats;
pub mod storage;
pub mod state;

pub use app::router;
pub use config::{Config, StoreKind};
pub use errors::LedgerError;
pub use ledger::{compute_goal, Ledger};
pub use state::AppState;
pub use storage::{CsvFileStore, MemoryStore, RecordStore};
