//! Per-property investment position.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// An address's locked stake in one property.
///
/// `property_tokens_owned` accumulates incrementally as
/// `sum(brx_amount_i / token_price_i)` across invest calls, so it is not a
/// simple ratio of `brx_invested` to the current price when the price moves
/// between calls.
///
/// Serde field names match the persisted client-ledger layout
/// (`userInvestmentBRX` / `userPropertyTokens`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "userInvestmentBRX")]
    pub brx_invested: Decimal,
    #[serde(rename = "userPropertyTokens")]
    pub property_tokens_owned: Decimal,
}

impl Position {
    /// The empty position. Unknown (address, property) pairs read as this.
    pub fn zero() -> Self {
        Position {
            brx_invested: Decimal::zero(),
            property_tokens_owned: Decimal::zero(),
        }
    }

    /// True when both fields are zero. A zeroed position is a valid steady
    /// state, not a deletion.
    pub fn is_zero(&self) -> bool {
        self.brx_invested.is_zero() && self.property_tokens_owned.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_persisted_field_names() {
        let pos = Position {
            brx_invested: Decimal::from_str("60").unwrap(),
            property_tokens_owned: Decimal::from_str("0.6").unwrap(),
        };
        let json = serde_json::to_value(pos).unwrap();
        assert_eq!(json["userInvestmentBRX"], 60.0);
        assert_eq!(json["userPropertyTokens"], 0.6);
    }

    #[test]
    fn test_zero_is_default() {
        assert_eq!(Position::zero(), Position::default());
        assert!(Position::zero().is_zero());
    }
}
