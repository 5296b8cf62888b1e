//! BRX account service: fungible balance plus append-only history.

use crate::domain::{Address, Decimal, PropertyId, Transaction, TransactionKind};
use crate::ledger::LedgerError;
use crate::store::{Ledger, WriteBatch};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Result of a successful BRX purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub new_balance: Decimal,
    pub transaction_id: String,
}

/// Result of a successful balance transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_id: String,
}

/// Manages an address's spendable BRX balance and transaction history.
///
/// Balances never go negative, and every mutation lands together with its
/// log entry in one atomic store batch.
#[derive(Debug, Clone)]
pub struct AccountService {
    ledger: Arc<Ledger>,
    settlement_delay: Duration,
}

impl AccountService {
    /// `settlement_delay` models chain confirmation latency; pass
    /// `Duration::ZERO` in tests.
    pub fn new(ledger: Arc<Ledger>, settlement_delay: Duration) -> Self {
        AccountService {
            ledger,
            settlement_delay,
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// The single awaited settlement boundary. Callers must treat an
    /// operation as unsettled until the call resolves.
    async fn settle(&self) {
        if !self.settlement_delay.is_zero() {
            tokio::time::sleep(self.settlement_delay).await;
        }
    }

    /// Buy BRX against USD at the fixed 1:1 peg.
    ///
    /// Credits the balance by `usd_amount` and appends a purchase record;
    /// both land atomically or not at all.
    pub async fn purchase(
        &self,
        address: &Address,
        usd_amount: Decimal,
    ) -> Result<PurchaseReceipt, LedgerError> {
        if !usd_amount.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "purchase amount must be positive".to_string(),
            ));
        }

        self.settle().await;

        let new_balance = self.ledger.balance(address).await? + usd_amount;
        let tx = Transaction::completed(TransactionKind::Purchase, usd_amount, None, None);

        let mut log = self.ledger.transactions(address).await?;
        log.insert(0, tx.clone());

        let mut batch = WriteBatch::new();
        batch.set_balance(address, new_balance);
        batch.set_transactions(address, &log)?;
        self.ledger.commit(batch).await?;

        debug!(address = %address, amount = %usd_amount, "purchase settled");
        Ok(PurchaseReceipt {
            new_balance,
            transaction_id: tx.id,
        })
    }

    /// Spendable balance; 0 for an unknown address. Read-only.
    pub async fn balance_of(&self, address: &Address) -> Result<Decimal, LedgerError> {
        self.settle().await;
        Ok(self.ledger.balance(address).await?)
    }

    /// Debit the balance, appending an investment-typed record. This is
    /// the internal mechanism backing `invest_in_property`; the debit and
    /// the log entry commit as one unit.
    pub async fn transfer(
        &self,
        address: &Address,
        amount: Decimal,
        property_id: Option<PropertyId>,
        property_name: Option<String>,
    ) -> Result<TransferReceipt, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "transfer amount must be positive".to_string(),
            ));
        }

        self.settle().await;

        let available = self.ledger.balance(address).await?;
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let tx = Transaction::completed(
            TransactionKind::Investment,
            amount,
            property_id,
            property_name,
        );
        let mut log = self.ledger.transactions(address).await?;
        log.insert(0, tx.clone());

        let mut batch = WriteBatch::new();
        batch.set_balance(address, available - amount);
        batch.set_transactions(address, &log)?;
        self.ledger.commit(batch).await?;

        debug!(address = %address, amount = %amount, "transfer settled");
        Ok(TransferReceipt {
            transaction_id: tx.id,
        })
    }

    /// Transaction history, most-recent-first. Stateless read.
    pub async fn history(&self, address: &Address) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.ledger.transactions(address).await?)
    }
}
