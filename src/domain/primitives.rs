//! Domain primitives: TimeMs, Address, PropertyId.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }
}

/// Wallet address. Treated as an opaque non-empty string key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

/// Error returned when parsing an [`Address`] from a string.
#[derive(Debug, Error)]
#[error("address must be a non-empty string")]
pub struct AddressParseError;

impl Address {
    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressParseError);
        }
        Ok(Address(trimmed.to_string()))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Property listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub i64);

impl PropertyId {
    /// Create a PropertyId from its numeric id.
    pub fn new(id: i64) -> Self {
        PropertyId(id)
    }

    /// Get the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_rejects_empty_and_whitespace() {
        assert!(Address::from_str("").is_err());
        assert!(Address::from_str("   ").is_err());
    }

    #[test]
    fn test_address_trims_input() {
        let addr = Address::from_str("  0xABC  ").unwrap();
        assert_eq!(addr.as_str(), "0xABC");
    }

    #[test]
    fn test_property_id_display() {
        assert_eq!(PropertyId::new(7).to_string(), "7");
    }

    #[test]
    fn test_timems_ordering() {
        assert!(TimeMs::new(1000) < TimeMs::new(2000));
    }

    #[test]
    fn test_timems_now_is_recent() {
        // Sanity bound: after 2020-01-01 in epoch ms.
        assert!(TimeMs::now().as_ms() > 1_577_836_800_000);
    }
}
