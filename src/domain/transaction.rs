//! Immutable wallet transaction log entries.

use crate::domain::{Decimal, PropertyId, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// BRX bought against USD (1:1 peg).
    Purchase,
    /// BRX debited from the spendable balance into a property position.
    Investment,
    /// BRX credited back out of a property position.
    Withdrawal,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Purchase => write!(f, "purchase"),
            TransactionKind::Investment => write!(f, "investment"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

/// Append-only wallet transaction record.
///
/// Never mutated or removed once written; the per-address log stores these
/// most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: TimeMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<PropertyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a completed transaction with a fresh unique id, stamped now.
    pub fn completed(
        kind: TransactionKind,
        amount: Decimal,
        property_id: Option<PropertyId>,
        property_name: Option<String>,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            timestamp: TimeMs::now(),
            property_id,
            property_name,
            status: TransactionStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_serde_shape_uses_type_and_camel_case() {
        let tx = Transaction::completed(
            TransactionKind::Investment,
            Decimal::from_str("60").unwrap(),
            Some(PropertyId::new(1)),
            Some("Marina Tower".to_string()),
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "investment");
        assert_eq!(json["propertyId"], 1);
        assert_eq!(json["propertyName"], "Marina Tower");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn test_property_fields_omitted_when_absent() {
        let tx = Transaction::completed(
            TransactionKind::Purchase,
            Decimal::from_str("100").unwrap(),
            None,
            None,
        );
        let json = serde_json::to_value(&tx).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.get("propertyId").is_none());
        assert!(obj.get("propertyName").is_none());
    }

    #[test]
    fn test_unique_ids() {
        let a = Transaction::completed(
            TransactionKind::Purchase,
            Decimal::zero(),
            None,
            None,
        );
        let b = Transaction::completed(
            TransactionKind::Purchase,
            Decimal::zero(),
            None,
            None,
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_roundtrip() {
        let tx = Transaction::completed(
            TransactionKind::Withdrawal,
            Decimal::from_str("12.75").unwrap(),
            Some(PropertyId::new(3)),
            None,
        );
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }
}
