//! Token amounts and the external fungible-token interface.
//!
//! The protocol never holds raw integers for money: every balance is a
//! [`TokenAmount`]. Transfers go through the [`TokenLedger`] trait, the
//! seam behind which the real token contract lives. [`TokenBook`] is an
//! in-crate ledger with ERC-20 style allowances, used by tests and local
//! simulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed token amount in base units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from base units
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Get raw base-unit value
    pub fn units(&self) -> u64 {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenAmount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl From<TokenAmount> for u64 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN LEDGER INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The external fungible-token interface.
///
/// Failure is signaled by an error return; the enclosing protocol call must
/// treat any failure as a hard failure (no partial settlement).
pub trait TokenLedger {
    /// Balance held by `owner`
    fn balance_of(&self, owner: &Address) -> TokenAmount;

    /// Move `amount` from `from` to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: TokenAmount) -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// the allowance `from` granted to `spender`
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<()>;

    /// Grant `spender` the right to move up to `amount` of `owner`'s funds
    fn approve(&mut self, owner: &Address, spender: &Address, amount: TokenAmount) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN BOOK
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory token ledger with balances and allowances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenBook {
    /// Token symbol (for logging)
    pub symbol: String,
    /// Balances by address
    balances: HashMap<Address, TokenAmount>,
    /// Allowances keyed by (owner, spender)
    allowances: HashMap<(Address, Address), TokenAmount>,
    /// Total minted supply
    total_supply: TokenAmount,
}

impl TokenBook {
    /// Create a new empty ledger
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: TokenAmount::ZERO,
        }
    }

    /// Mint new tokens to an address
    pub fn mint(&mut self, to: Address, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let new_supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "mint total supply".into(),
        })?;
        let new_balance = self.balance_of(&to).checked_add(amount).ok_or(Error::Overflow {
            operation: "mint balance".into(),
        })?;

        self.balances.insert(to, new_balance);
        self.total_supply = new_supply;
        Ok(())
    }

    /// Get total supply
    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Allowance granted by `owner` to `spender`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u64 = self.balances.values().map(|b| b.units()).sum();
        sum == self.total_supply.units()
    }

    fn debit(&mut self, from: &Address, amount: TokenAmount) -> Result<()> {
        let balance = self.balance_of(from);
        let new_balance = balance.checked_sub(amount).ok_or(Error::InsufficientBalance {
            required: amount.units(),
            available: balance.units(),
        })?;
        if new_balance.is_zero() {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, new_balance);
        }
        Ok(())
    }

    fn credit(&mut self, to: &Address, amount: TokenAmount) -> Result<()> {
        let new_balance = self.balance_of(to).checked_add(amount).ok_or(Error::Overflow {
            operation: "transfer balance".into(),
        })?;
        self.balances.insert(*to, new_balance);
        Ok(())
    }
}

impl TokenLedger for TokenBook {
    fn balance_of(&self, owner: &Address) -> TokenAmount {
        self.balances.get(owner).copied().unwrap_or(TokenAmount::ZERO)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if from == to {
            return Ok(());
        }

        self.debit(from, amount)?;
        self.credit(to, amount)?;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        // Spending your own funds needs no allowance.
        if spender != from {
            let approved = self.allowance(from, spender);
            let remaining = approved.checked_sub(amount).ok_or(Error::InsufficientAllowance {
                required: amount.units(),
                approved: approved.units(),
            })?;
            self.allowances.insert((*from, *spender), remaining);
        }

        self.transfer(from, to, amount)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: TokenAmount) -> Result<()> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alice() -> Address {
        Address::derive("alice")
    }

    fn bob() -> Address {
        Address::derive("bob")
    }

    #[test]
    fn test_mint_and_balance() {
        let mut book = TokenBook::new("WORK");
        book.mint(alice(), TokenAmount::from_units(1000)).unwrap();

        assert_eq!(book.balance_of(&alice()), TokenAmount::from_units(1000));
        assert_eq!(book.total_supply(), TokenAmount::from_units(1000));
    }

    #[test]
    fn test_transfer() {
        let mut book = TokenBook::new("WORK");
        book.mint(alice(), TokenAmount::from_units(1000)).unwrap();
        book.transfer(&alice(), &bob(), TokenAmount::from_units(300)).unwrap();

        assert_eq!(book.balance_of(&alice()), TokenAmount::from_units(700));
        assert_eq!(book.balance_of(&bob()), TokenAmount::from_units(300));
        assert!(book.verify_supply_invariant());
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut book = TokenBook::new("WORK");
        book.mint(alice(), TokenAmount::from_units(100)).unwrap();

        let result = book.transfer(&alice(), &bob(), TokenAmount::from_units(200));
        assert!(matches!(result, Err(Error::InsufficientBalance { .. })));
        assert_eq!(book.balance_of(&alice()), TokenAmount::from_units(100));
    }

    #[test]
    fn test_transfer_from_requires_allowance() {
        let mut book = TokenBook::new("WORK");
        let registry = Address::derive("registry");
        book.mint(alice(), TokenAmount::from_units(1000)).unwrap();

        let result =
            book.transfer_from(&registry, &alice(), &registry, TokenAmount::from_units(500));
        assert!(matches!(result, Err(Error::InsufficientAllowance { .. })));

        book.approve(&alice(), &registry, TokenAmount::from_units(500)).unwrap();
        book.transfer_from(&registry, &alice(), &registry, TokenAmount::from_units(500))
            .unwrap();

        assert_eq!(book.balance_of(&registry), TokenAmount::from_units(500));
        assert_eq!(book.allowance(&alice(), &registry), TokenAmount::ZERO);
    }

    #[test]
    fn test_transfer_from_own_funds_skips_allowance() {
        let mut book = TokenBook::new("WORK");
        book.mint(alice(), TokenAmount::from_units(100)).unwrap();

        book.transfer_from(&alice(), &alice(), &bob(), TokenAmount::from_units(40)).unwrap();
        assert_eq!(book.balance_of(&bob()), TokenAmount::from_units(40));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut book = TokenBook::new("WORK");
        assert_eq!(book.transfer(&alice(), &bob(), TokenAmount::ZERO), Err(Error::ZeroAmount));
        assert_eq!(book.mint(alice(), TokenAmount::ZERO), Err(Error::ZeroAmount));
    }

    proptest! {
        #[test]
        fn prop_checked_add_matches_u64(a in any::<u64>(), b in any::<u64>()) {
            let sum = TokenAmount::from_units(a).checked_add(TokenAmount::from_units(b));
            prop_assert_eq!(sum.map(|s| s.units()), a.checked_add(b));
        }

        #[test]
        fn prop_sub_undoes_add(a in any::<u64>(), b in any::<u64>()) {
            let lhs = TokenAmount::from_units(a);
            let rhs = TokenAmount::from_units(b);
            match lhs.checked_add(rhs) {
                Some(sum) => {
                    prop_assert_eq!(sum.checked_sub(rhs), Some(lhs));
                    prop_assert_eq!(sum.saturating_sub(rhs), lhs);
                }
                None => prop_assert!(a.checked_add(b).is_none()),
            }
        }

        #[test]
        fn prop_checked_sub_never_wraps(a in any::<u64>(), b in any::<u64>()) {
            let diff = TokenAmount::from_units(a).checked_sub(TokenAmount::from_units(b));
            prop_assert_eq!(diff.is_some(), a >= b);
            if let Some(d) = diff {
                prop_assert_eq!(d.units(), a - b);
            }
        }
    }
}
