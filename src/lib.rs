pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod store;

pub use config::Config;
pub use db::{init_db, MirrorRepository};
pub use domain::{
    Address, BlockchainEvent, Decimal, EventData, EventKind, Position, PropertyId, TimeMs,
    Transaction, TransactionKind, TransactionStatus,
};
pub use error::AppError;
pub use ledger::{AccountService, InvestmentService, LedgerError};
pub use store::{JsonFileKvStore, KvStore, Ledger, MemoryKvStore, StoreError};
