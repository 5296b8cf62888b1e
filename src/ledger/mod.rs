//! Client-side BRX account and investment services.
//!
//! One logical operation is in flight per user action; every mutating call
//! awaits a single simulated settlement delay standing in for chain
//! confirmation, then commits its writes as one atomic batch.

pub mod account;
pub mod investment;

pub use account::{AccountService, PurchaseReceipt, TransferReceipt};
pub use investment::{InvestReceipt, InvestmentService, WithdrawReceipt};

use crate::domain::Decimal;
use crate::store::StoreError;
use thiserror::Error;

/// Failure taxonomy for ledger operations.
///
/// `InsufficientBalance` and `ExceedsHolding` are distinct variants so a
/// caller can surface a specific message; everything else collapses to a
/// generic failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },
    #[error("withdrawal exceeds holding: requested {requested} tokens, owned {owned}")]
    ExceedsHolding { requested: Decimal, owned: Decimal },
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Pseudo transaction hash for simulated settlement receipts.
pub(crate) fn simulated_tx_hash() -> String {
    format!("0x{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_tx_hash_shape() {
        let hash = simulated_tx_hash();
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 34);
        assert_ne!(hash, simulated_tx_hash());
    }
}
