//! The external redemption object interface.
//!
//! A redemption is resolved outside this crate (deposit contracts, lot
//! sizing, signing group); the engine only needs its live parameters at
//! settlement time, exposed through the [`Redemption`] trait.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::token::TokenAmount;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// REDEMPTION INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Live view of the redemption being settled
pub trait Redemption {
    /// Settlement amount that must be pulled from the redeemer
    fn required_settlement_amount(&self) -> TokenAmount;

    /// Current collateralization percentage of the redemption
    fn collateralization_percentage(&self) -> u64;

    /// Whether `address` is a member of the redemption's authoritative
    /// operator set
    fn is_operator(&self, address: &Address) -> bool;

    /// Where the pulled settlement amount is forwarded
    fn settlement_address(&self) -> Address;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC REDEMPTION
// ═══════════════════════════════════════════════════════════════════════════════

/// A redemption with fixed parameters, for tests and local simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRedemption {
    /// Required settlement amount
    pub required_amount: TokenAmount,
    /// Live collateralization percentage
    pub collateralization_pct: u64,
    /// Authoritative operator set
    pub operators: BTreeSet<Address>,
    /// Settlement forwarding address
    pub settlement_to: Address,
}

impl StaticRedemption {
    /// Create a redemption view
    pub fn new(
        required_amount: TokenAmount,
        collateralization_pct: u64,
        operators: impl IntoIterator<Item = Address>,
        settlement_to: Address,
    ) -> Self {
        Self {
            required_amount,
            collateralization_pct,
            operators: operators.into_iter().collect(),
            settlement_to,
        }
    }
}

impl Redemption for StaticRedemption {
    fn required_settlement_amount(&self) -> TokenAmount {
        self.required_amount
    }

    fn collateralization_percentage(&self) -> u64 {
        self.collateralization_pct
    }

    fn is_operator(&self, address: &Address) -> bool {
        self.operators.contains(address)
    }

    fn settlement_address(&self) -> Address {
        self.settlement_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_membership() {
        let op = Address::derive("operator");
        let redemption = StaticRedemption::new(
            TokenAmount::from_units(100),
            130,
            [op],
            Address::derive("vending"),
        );

        assert!(redemption.is_operator(&op));
        assert!(!redemption.is_operator(&Address::derive("other")));
        assert_eq!(redemption.collateralization_percentage(), 130);
    }
}
