//! Result storage module
//!
//! Keeps the ordered calculation history and writes it through to a
//! pluggable key-value backend.

mod kv;
mod file_store;
mod memory_store;
mod record_store;
pub mod types;

#[cfg(test)]
mod tests;

pub use kv::KeyValueStore;
pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
pub use record_store::{ResultStore, STORAGE_KEY, Snapshot};
pub use types::HistorySummary;
