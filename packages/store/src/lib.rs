pub mod config;
pub mod models;
pub mod portable;

pub mod local;
pub use local::{KvStore, LocalStore, COLLECTION_KEY, SESSION_KEY};

mod memory;
pub use memory::MemoryStore;

mod file_store;
pub use file_store::FileStore;

pub use config::SubwatchConfig;
pub use models::{BillingPeriod, RenewalMode, Session, Subscription};
pub use portable::ImportError;
