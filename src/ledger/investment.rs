//! Investment service: moves BRX between the spendable balance and
//! per-property locked positions.

use crate::domain::{Address, Decimal, Position, PropertyId, Transaction, TransactionKind};
use crate::ledger::{simulated_tx_hash, AccountService, LedgerError};
use crate::store::{Ledger, WriteBatch};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Result of a successful property investment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestReceipt {
    pub tx_hash: String,
    pub brx_amount: Decimal,
}

/// Result of a successful property withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_hash: String,
    pub brx_equivalent: Decimal,
}

/// Invest/withdraw state transitions against a property.
///
/// A position is created lazily on first invest and persists indefinitely;
/// zero is a valid steady state. Token conversion uses the `token_price`
/// supplied per call, so `property_tokens_owned` accumulates incrementally
/// across calls and is not a simple ratio when the price moves.
#[derive(Debug, Clone)]
pub struct InvestmentService {
    accounts: AccountService,
    ledger: Arc<Ledger>,
    settlement_delay: Duration,
}

impl InvestmentService {
    pub fn new(accounts: AccountService, settlement_delay: Duration) -> Self {
        let ledger = accounts.ledger().clone();
        InvestmentService {
            accounts,
            ledger,
            settlement_delay,
        }
    }

    async fn settle(&self) {
        if !self.settlement_delay.is_zero() {
            tokio::time::sleep(self.settlement_delay).await;
        }
    }

    /// Lock `brx_amount` from the spendable balance into the property
    /// position, crediting `brx_amount / token_price` property tokens.
    ///
    /// The balance debit goes through [`AccountService::transfer`], which
    /// enforces sufficiency and records the investment transaction.
    pub async fn invest_in_property(
        &self,
        address: &Address,
        property_id: PropertyId,
        brx_amount: Decimal,
        token_price: Decimal,
        property_name: Option<String>,
    ) -> Result<InvestReceipt, LedgerError> {
        if !brx_amount.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "investment amount must be positive".to_string(),
            ));
        }
        if !token_price.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "token price must be positive".to_string(),
            ));
        }

        self.accounts
            .transfer(address, brx_amount, Some(property_id), property_name)
            .await?;

        let mut positions = self.ledger.positions(address).await?;
        let entry = positions
            .entry(property_id.to_string())
            .or_insert_with(Position::zero);
        entry.brx_invested = entry.brx_invested + brx_amount;
        entry.property_tokens_owned = entry.property_tokens_owned + brx_amount / token_price;

        let mut batch = WriteBatch::new();
        batch.set_positions(address, &positions)?;
        self.ledger.commit(batch).await?;

        debug!(
            address = %address,
            property_id = %property_id,
            amount = %brx_amount,
            "investment settled"
        );
        Ok(InvestReceipt {
            tx_hash: simulated_tx_hash(),
            brx_amount,
        })
    }

    /// Release `token_amount` property tokens back into BRX at
    /// `token_price`, clamping both position fields at zero.
    ///
    /// The balance credit, position decrement, and withdrawal record
    /// commit as a single atomic batch.
    pub async fn withdraw_from_property(
        &self,
        address: &Address,
        property_id: PropertyId,
        token_amount: Decimal,
        token_price: Decimal,
        property_name: Option<String>,
    ) -> Result<WithdrawReceipt, LedgerError> {
        if !token_amount.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "withdrawal amount must be positive".to_string(),
            ));
        }
        if !token_price.is_positive() {
            return Err(LedgerError::InvalidArgument(
                "token price must be positive".to_string(),
            ));
        }

        self.settle().await;

        let mut positions = self.ledger.positions(address).await?;
        let current = positions
            .get(&property_id.to_string())
            .copied()
            .unwrap_or_else(Position::zero);

        if token_amount > current.property_tokens_owned {
            return Err(LedgerError::ExceedsHolding {
                requested: token_amount,
                owned: current.property_tokens_owned,
            });
        }

        let brx_equivalent = token_amount * token_price;
        let updated = Position {
            brx_invested: (current.brx_invested - brx_equivalent).clamp_at_zero(),
            property_tokens_owned: (current.property_tokens_owned - token_amount).clamp_at_zero(),
        };
        positions.insert(property_id.to_string(), updated);

        let new_balance = self.ledger.balance(address).await? + brx_equivalent;
        let tx = Transaction::completed(
            TransactionKind::Withdrawal,
            brx_equivalent,
            Some(property_id),
            property_name,
        );
        let mut log = self.ledger.transactions(address).await?;
        log.insert(0, tx);

        let mut batch = WriteBatch::new();
        batch.set_balance(address, new_balance);
        batch.set_transactions(address, &log)?;
        batch.set_positions(address, &positions)?;
        self.ledger.commit(batch).await?;

        debug!(
            address = %address,
            property_id = %property_id,
            tokens = %token_amount,
            brx = %brx_equivalent,
            "withdrawal settled"
        );
        Ok(WithdrawReceipt {
            tx_hash: simulated_tx_hash(),
            brx_equivalent,
        })
    }

    /// Position for one (address, property) pair; zeros when unknown.
    pub async fn position_of(
        &self,
        address: &Address,
        property_id: PropertyId,
    ) -> Result<Position, LedgerError> {
        Ok(self.ledger.position(address, property_id).await?)
    }
}
