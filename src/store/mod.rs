//! Client-local ledger persistence.
//!
//! The client ledger lives in a small key-value substrate (the browser-era
//! layout kept the same keys in localStorage). `KvStore` abstracts that
//! substrate so services can be tested against an in-memory store and run
//! against a durable file store.

pub mod file;
pub mod ledger;
pub mod memory;

pub use file::JsonFileKvStore;
pub use ledger::{Ledger, WriteBatch};
pub use memory::MemoryKvStore;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for key-value store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failure: {0}")]
    Io(String),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Key-value persistence for the client-local ledger.
///
/// `put_many` is the only write primitive and it is atomic: either every
/// pair in the batch lands or none do. Balance, transaction log, and
/// position writes for one logical operation always travel in one batch,
/// so a ledger mutation can never be half-applied.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Read the raw value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Atomically write every (key, value) pair in the batch.
    async fn put_many(&self, pairs: &[(String, String)]) -> Result<(), StoreError>;
}
