//! Typed view over the client-local ledger key layout.
//!
//! Keys per address:
//! - `brx_wallet_balance_<address>` -> decimal string
//! - `brx_wallet_transactions_<address>` -> JSON array of transactions,
//!   most-recent-first
//! - `brx_user_investments_<address>` -> JSON map of propertyId to position

use crate::domain::{Address, Decimal, Position, PropertyId, Transaction};
use crate::store::{KvStore, StoreError};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

const BALANCE_PREFIX: &str = "brx_wallet_balance_";
const TRANSACTIONS_PREFIX: &str = "brx_wallet_transactions_";
const INVESTMENTS_PREFIX: &str = "brx_user_investments_";

fn balance_key(address: &Address) -> String {
    format!("{}{}", BALANCE_PREFIX, address)
}

fn transactions_key(address: &Address) -> String {
    format!("{}{}", TRANSACTIONS_PREFIX, address)
}

fn investments_key(address: &Address) -> String {
    format!("{}{}", INVESTMENTS_PREFIX, address)
}

/// Map of property id (stringified) to position, as persisted.
pub type PositionMap = BTreeMap<String, Position>;

/// The client-side BRX ledger: an explicit object owning its storage
/// handle. Services receive it by `Arc`, never through a global.
#[derive(Debug, Clone)]
pub struct Ledger {
    store: Arc<dyn KvStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Ledger { store }
    }

    /// Spendable BRX balance for an address. Unknown addresses read as 0;
    /// accounts are created implicitly on first write.
    pub async fn balance(&self, address: &Address) -> Result<Decimal, StoreError> {
        let key = balance_key(address);
        match self.store.get(&key).await? {
            None => Ok(Decimal::zero()),
            Some(raw) => Decimal::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        }
    }

    /// Transaction log for an address, most-recent-first.
    pub async fn transactions(&self, address: &Address) -> Result<Vec<Transaction>, StoreError> {
        let key = transactions_key(address);
        match self.store.get(&key).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        }
    }

    /// All positions for an address, keyed by property id.
    pub async fn positions(&self, address: &Address) -> Result<PositionMap, StoreError> {
        let key = investments_key(address);
        match self.store.get(&key).await? {
            None => Ok(PositionMap::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        }
    }

    /// Position for one (address, property) pair; zeros when unknown.
    pub async fn position(
        &self,
        address: &Address,
        property_id: PropertyId,
    ) -> Result<Position, StoreError> {
        let positions = self.positions(address).await?;
        Ok(positions
            .get(&property_id.to_string())
            .copied()
            .unwrap_or_else(Position::zero))
    }

    /// Commit a staged batch atomically.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.store.put_many(&batch.pairs).await
    }
}

/// Staged ledger writes for one logical operation. All entries are
/// committed through a single atomic `put_many`.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pairs: Vec<(String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&mut self, address: &Address, balance: Decimal) {
        self.pairs
            .push((balance_key(address), balance.to_canonical_string()));
    }

    pub fn set_transactions(
        &mut self,
        address: &Address,
        log: &[Transaction],
    ) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(log).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.pairs.push((transactions_key(address), encoded));
        Ok(())
    }

    pub fn set_positions(
        &mut self,
        address: &Address,
        positions: &PositionMap,
    ) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(positions).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.pairs.push((investments_key(address), encoded));
        Ok(())
    }
}
