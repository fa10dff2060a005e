//! Card policy configuration.
//!
//! These values come from deployment configuration in a real installation;
//! the defaults here match the documented policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPolicy {
    /// Hard ceiling on a single transfer amount.
    pub max_transfer_amount: Decimal,
    /// A source card may not drop below this balance through a transfer.
    pub min_balance: Decimal,
    /// Daily limit assigned to new cards when none is requested.
    pub default_daily_limit: Decimal,
    /// New cards expire this many years after issuance.
    pub validity_years: u32,
}

impl Default for CardPolicy {
    fn default() -> Self {
        CardPolicy {
            max_transfer_amount: Decimal::new(100_000_00, 2),
            min_balance: Decimal::ZERO,
            default_daily_limit: Decimal::new(5_000_00, 2),
            validity_years: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let policy = CardPolicy::default();
        assert_eq!(policy.max_transfer_amount, Decimal::new(100_000_00, 2));
        assert_eq!(policy.min_balance, Decimal::ZERO);
        assert_eq!(policy.default_daily_limit, Decimal::new(5_000_00, 2));
        assert_eq!(policy.validity_years, 3);
    }
}
