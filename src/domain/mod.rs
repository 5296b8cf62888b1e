//! Domain types: primitives, decimal arithmetic, transactions, positions,
//! and the blockchain event wire format.

pub mod decimal;
pub mod event;
pub mod position;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use event::{BlockchainEvent, EventData, EventKind};
pub use position::Position;
pub use primitives::{Address, AddressParseError, PropertyId, TimeMs};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
