//! Sparse reward schedule keyed by redemption-size tier.
//!
//! Tiers are arbitrary integers, so the table is an explicit key-presence
//! map rather than a dense array. An absent tier resolves to a zero
//! reward, never an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::token::TokenAmount;

// ═══════════════════════════════════════════════════════════════════════════════
// REWARD SCHEDULE
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-rewarder mapping from redemption-size tier to reward amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    tiers: BTreeMap<u64, TokenAmount>,
}

impl RewardSchedule {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward configured for `tier` (zero if unset)
    pub fn reward_for(&self, tier: u64) -> TokenAmount {
        self.tiers.get(&tier).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Set the reward for a single tier
    pub fn set(&mut self, tier: u64, reward: TokenAmount) {
        self.tiers.insert(tier, reward);
    }

    /// Apply a batch of (tier, reward) entries.
    ///
    /// Partial update: tiers not mentioned retain their prior values.
    pub fn apply(&mut self, entries: &[(u64, TokenAmount)]) {
        for (tier, reward) in entries {
            self.tiers.insert(*tier, *reward);
        }
    }

    /// Number of configured tiers
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether no tier is configured
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Iterate configured (tier, reward) pairs in tier order
    pub fn iter(&self) -> impl Iterator<Item = (u64, TokenAmount)> + '_ {
        self.tiers.iter().map(|(t, r)| (*t, *r))
    }

    /// Parse a flattened `[tier, reward, tier, reward, ...]` sequence.
    ///
    /// Fails on odd length or when the pair count exceeds `max_entries`.
    pub fn parse_flattened(flattened: &[u64], max_entries: usize) -> Result<Vec<(u64, TokenAmount)>> {
        if flattened.len() % 2 != 0 {
            return Err(Error::InvalidParameter {
                name: "schedule_entries".into(),
                reason: format!("expected (tier, reward) pairs, got {} values", flattened.len()),
            });
        }
        let pairs = flattened.len() / 2;
        if pairs > max_entries {
            return Err(Error::InvalidParameter {
                name: "schedule_entries".into(),
                reason: format!("{} entries exceed maximum {}", pairs, max_entries),
            });
        }

        Ok(flattened
            .chunks_exact(2)
            .map(|pair| (pair[0], TokenAmount::from_units(pair[1])))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_tier_resolves_to_zero() {
        let mut schedule = RewardSchedule::new();
        schedule.set(1, TokenAmount::from_units(10));

        assert_eq!(schedule.reward_for(1), TokenAmount::from_units(10));
        assert_eq!(schedule.reward_for(2), TokenAmount::ZERO);
    }

    #[test]
    fn test_partial_update_retains_other_tiers() {
        let mut schedule = RewardSchedule::new();
        schedule.apply(&[(1, TokenAmount::from_units(10)), (5, TokenAmount::from_units(50))]);
        schedule.apply(&[(5, TokenAmount::from_units(55))]);

        assert_eq!(schedule.reward_for(1), TokenAmount::from_units(10));
        assert_eq!(schedule.reward_for(5), TokenAmount::from_units(55));
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_parse_flattened() {
        let entries = RewardSchedule::parse_flattened(&[1, 10, 5, 50], 8).unwrap();
        assert_eq!(entries, vec![
            (1, TokenAmount::from_units(10)),
            (5, TokenAmount::from_units(50)),
        ]);
    }

    #[test]
    fn test_parse_flattened_odd_length() {
        assert!(RewardSchedule::parse_flattened(&[1, 10, 5], 8).is_err());
    }

    #[test]
    fn test_parse_flattened_too_many_entries() {
        assert!(RewardSchedule::parse_flattened(&[1, 10, 5, 50], 1).is_err());
    }
}
