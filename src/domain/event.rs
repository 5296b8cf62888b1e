//! Blockchain event wire format consumed by the reconciliation endpoint.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of finalized on-chain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    TokenExchange,
    PropertyInvestment,
    PropertyWithdrawal,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::TokenExchange => write!(f, "TokenExchange"),
            EventKind::PropertyInvestment => write!(f, "PropertyInvestment"),
            EventKind::PropertyWithdrawal => write!(f, "PropertyWithdrawal"),
        }
    }
}

/// Event-specific payload. Which fields are present depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usdt_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brx_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_amount: Option<Decimal>,
}

/// An already-finalized blockchain event delivered by the external listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainEvent {
    pub event_type: EventKind,
    pub user_address: String,
    pub transaction_hash: String,
    pub block_number: i64,
    pub timestamp: i64,
    #[serde(default)]
    pub data: EventData,
}

impl BlockchainEvent {
    /// Stable idempotency key for this event.
    ///
    /// The normalized `transaction_hash` when present; otherwise a
    /// truncated SHA-256 over the deterministic fields. 128 bits keeps
    /// collision probability negligible for any realistic event volume.
    pub fn event_key(&self) -> String {
        let hash = self.transaction_hash.trim();
        if !hash.is_empty() {
            return hash.to_lowercase();
        }

        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, &self.event_type.to_string());
        hash_var(&mut hasher, &self.user_address);
        hasher.update(self.block_number.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());

        let digest = hasher.finalize();
        format!("hash:{}", hex::encode(&digest[..16]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_event(tx_hash: &str) -> BlockchainEvent {
        BlockchainEvent {
            event_type: EventKind::TokenExchange,
            user_address: "0xABC".to_string(),
            transaction_hash: tx_hash.to_string(),
            block_number: 42,
            timestamp: 1_705_000_000_000,
            data: EventData {
                brx_amount: Some(Decimal::from_str("100").unwrap()),
                ..EventData::default()
            },
        }
    }

    #[test]
    fn test_deserializes_wire_payload() {
        let json = r#"{
            "eventType": "PropertyInvestment",
            "userAddress": "0xABC",
            "transactionHash": "0xDEAD",
            "blockNumber": 7,
            "timestamp": 1705000000000,
            "data": { "brxAmount": 60, "propertyId": 1, "tokenAmount": 0.6 }
        }"#;
        let event: BlockchainEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventKind::PropertyInvestment);
        assert_eq!(event.data.property_id, Some(1));
        assert_eq!(
            event.data.token_amount,
            Some(Decimal::from_str("0.6").unwrap())
        );
        assert!(event.data.usdt_amount.is_none());
    }

    #[test]
    fn test_event_key_normalizes_tx_hash() {
        assert_eq!(sample_event(" 0xDEADBEEF ").event_key(), "0xdeadbeef");
    }

    #[test]
    fn test_event_key_fallback_is_deterministic() {
        let a = sample_event("");
        let b = sample_event("   ");
        assert_eq!(a.event_key(), b.event_key());
        assert!(a.event_key().starts_with("hash:"));
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let json = r#"{
            "eventType": "SomethingElse",
            "userAddress": "0xABC",
            "transactionHash": "0x1",
            "blockNumber": 1,
            "timestamp": 1
        }"#;
        assert!(serde_json::from_str::<BlockchainEvent>(json).is_err());
    }
}
