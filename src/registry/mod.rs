//! Rewarder registry.
//!
//! A growable arena of rewarder records addressed by stable integer
//! indexes. Each record is mutable only by its owner; collateral custody
//! moves through the [`TokenLedger`] seam. Records are created once and
//! live indefinitely.

pub mod schedule;

pub use schedule::RewardSchedule;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::token::{TokenAmount, TokenLedger};
use crate::utils::constants::{MAX_COLLATERALIZATION_PCT, MAX_SCHEDULE_ENTRIES};
use crate::utils::crypto::Address;

/// Stable index of a rewarder record
pub type RewarderId = u64;

// ═══════════════════════════════════════════════════════════════════════════════
// REWARDER
// ═══════════════════════════════════════════════════════════════════════════════

/// One registered rewarder: collateral plus a reward schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rewarder {
    /// Address with exclusive right to mutate this record
    pub owner: Address,
    /// Identity that must match the redemption's operator set at settlement time
    pub operator: Address,
    /// Collateral currently held on behalf of this rewarder
    collateral: TokenAmount,
    /// Rewards only flow when the redemption's live collateralization is
    /// strictly below this percentage
    pub min_collateralization_pct: u64,
    /// Tier-keyed reward schedule
    schedule: RewardSchedule,
    /// Registration timestamp
    pub created_at: u64,
}

impl Rewarder {
    /// Current collateral balance
    pub fn collateral(&self) -> TokenAmount {
        self.collateral
    }

    /// The reward schedule
    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    /// Whether a redemption at `collateralization_pct` is eligible for a
    /// reward from this rewarder
    pub fn rewards_at(&self, collateralization_pct: u64) -> bool {
        collateralization_pct < self.min_collateralization_pct
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REWARDER REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry of rewarder records and their collateral custody
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewarderRegistry {
    /// Address holding the pooled collateral
    custody: Address,
    /// Rewarder records, addressed by index
    rewarders: Vec<Rewarder>,
    /// Maximum schedule entries accepted per update
    max_schedule_entries: usize,
    /// Registry event log
    events: EventLog,
}

impl RewarderRegistry {
    /// Create a registry whose collateral is held at `custody`
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            rewarders: Vec::new(),
            max_schedule_entries: MAX_SCHEDULE_ENTRIES,
            events: EventLog::new(),
        }
    }

    /// Create a registry with a custom schedule-entry limit
    pub fn with_limits(custody: Address, max_schedule_entries: usize) -> Self {
        Self {
            max_schedule_entries,
            ..Self::new(custody)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MUTATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register a new rewarder.
    ///
    /// Pulls `initial_deposit` from `caller` into custody (the caller must
    /// have approved the custody address as spender), appends the record,
    /// and populates the schedule from flattened `[tier, reward, ...]`
    /// pairs. Fails without appending if the token pull fails.
    #[allow(clippy::too_many_arguments)]
    pub fn add_rewarder(
        &mut self,
        caller: Address,
        operator: Address,
        initial_deposit: TokenAmount,
        schedule_entries: &[u64],
        min_collateralization_pct: u64,
        ledger: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<RewarderId> {
        Self::validate_threshold(min_collateralization_pct)?;
        let entries =
            RewardSchedule::parse_flattened(schedule_entries, self.max_schedule_entries)?;

        if !initial_deposit.is_zero() {
            ledger.transfer_from(&self.custody, &caller, &self.custody, initial_deposit)?;
        }

        let mut schedule = RewardSchedule::new();
        schedule.apply(&entries);

        let index = self.rewarders.len() as RewarderId;
        self.rewarders.push(Rewarder {
            owner: caller,
            operator,
            collateral: initial_deposit,
            min_collateralization_pct,
            schedule,
            created_at: now,
        });

        info!(index, owner = %caller, deposit = %initial_deposit, "rewarder registered");
        self.events.push(ProtocolEvent::RewarderAdded {
            index,
            owner: caller,
            operator,
            deposit: initial_deposit,
            timestamp: now,
        });

        Ok(index)
    }

    /// Change a rewarder's collateralization threshold (owner only)
    pub fn set_minimum_collateralization_percentage(
        &mut self,
        caller: Address,
        index: RewarderId,
        value: u64,
        now: u64,
    ) -> Result<()> {
        Self::validate_threshold(value)?;
        let rewarder = self.rewarder_owned_mut(caller, index)?;
        rewarder.min_collateralization_pct = value;

        self.events.push(ProtocolEvent::MinimumCollateralizationChanged {
            index,
            value,
            timestamp: now,
        });
        Ok(())
    }

    /// Overwrite/extend a rewarder's schedule from flattened pairs (owner only).
    ///
    /// Partial update: tiers not mentioned retain their prior values.
    pub fn set_rewards(
        &mut self,
        caller: Address,
        index: RewarderId,
        flattened_pairs: &[u64],
        now: u64,
    ) -> Result<()> {
        let entries = RewardSchedule::parse_flattened(flattened_pairs, self.max_schedule_entries)?;
        let rewarder = self.rewarder_owned_mut(caller, index)?;
        rewarder.schedule.apply(&entries);

        self.events.push(ProtocolEvent::ScheduleUpdated {
            index,
            entries: entries.len(),
            timestamp: now,
        });
        Ok(())
    }

    /// Add collateral to a rewarder.
    ///
    /// Open to any caller since it only increases the balance; tokens are
    /// pulled from the actual caller.
    pub fn top_up(
        &mut self,
        caller: Address,
        index: RewarderId,
        amount: TokenAmount,
        ledger: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let rewarder = self
            .rewarders
            .get(index as usize)
            .ok_or(Error::RewarderNotFound(index))?;
        let new_balance = rewarder.collateral.checked_add(amount).ok_or(Error::Overflow {
            operation: "top up collateral".into(),
        })?;

        ledger.transfer_from(&self.custody, &caller, &self.custody, amount)?;
        self.rewarders[index as usize].collateral = new_balance;

        info!(index, amount = %amount, "collateral topped up");
        self.events.push(ProtocolEvent::CollateralToppedUp {
            index,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Withdraw collateral to the owner (owner only).
    ///
    /// Rejects any amount exceeding the current balance; never wraps.
    pub fn withdraw(
        &mut self,
        caller: Address,
        index: RewarderId,
        amount: TokenAmount,
        ledger: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        let rewarder = self.rewarder_owned_mut(caller, index)?;
        let new_balance =
            rewarder.collateral.checked_sub(amount).ok_or(Error::InsufficientCollateral {
                required: amount.units(),
                available: rewarder.collateral.units(),
            })?;

        let owner = rewarder.owner;
        ledger.transfer(&self.custody, &owner, amount)?;
        self.rewarders[index as usize].collateral = new_balance;

        info!(index, amount = %amount, "collateral withdrawn");
        self.events.push(ProtocolEvent::CollateralWithdrawn {
            index,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// Deduct a payout from a rewarder's collateral.
    ///
    /// Settlement-engine internal: the engine has already verified the
    /// balance covers the payout during its pure pass.
    pub(crate) fn deduct_collateral(&mut self, index: RewarderId, amount: TokenAmount) -> Result<()> {
        let rewarder = self
            .rewarders
            .get_mut(index as usize)
            .ok_or(Error::RewarderNotFound(index))?;
        rewarder.collateral =
            rewarder.collateral.checked_sub(amount).ok_or(Error::InsufficientCollateral {
                required: amount.units(),
                available: rewarder.collateral.units(),
            })?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Look up a rewarder record
    pub fn rewarder(&self, index: RewarderId) -> Result<&Rewarder> {
        self.rewarders
            .get(index as usize)
            .ok_or(Error::RewarderNotFound(index))
    }

    /// Reward configured for `tier` on rewarder `index` (zero if unset)
    pub fn reward_for(&self, index: RewarderId, tier: u64) -> Result<TokenAmount> {
        Ok(self.rewarder(index)?.schedule.reward_for(tier))
    }

    /// Collateral currently held for rewarder `index`
    pub fn collateral_of(&self, index: RewarderId) -> Result<TokenAmount> {
        Ok(self.rewarder(index)?.collateral)
    }

    /// Number of registered rewarders
    pub fn len(&self) -> usize {
        self.rewarders.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rewarders.is_empty()
    }

    /// Custody address holding the pooled collateral
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Registry event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Sum of all rewarder collateral (custody solvency check)
    pub fn total_collateral(&self) -> TokenAmount {
        self.rewarders.iter().fold(TokenAmount::ZERO, |acc, r| {
            acc.checked_add(r.collateral).unwrap_or(acc)
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    fn rewarder_owned_mut(&mut self, caller: Address, index: RewarderId) -> Result<&mut Rewarder> {
        let rewarder = self
            .rewarders
            .get_mut(index as usize)
            .ok_or(Error::RewarderNotFound(index))?;
        if rewarder.owner != caller {
            return Err(Error::Unauthorized(format!(
                "caller {} is not the owner of rewarder {}",
                caller, index
            )));
        }
        Ok(rewarder)
    }

    fn validate_threshold(pct: u64) -> Result<()> {
        if pct > MAX_COLLATERALIZATION_PCT {
            return Err(Error::InvalidParameter {
                name: "min_collateralization_pct".into(),
                reason: format!("exceeds maximum {}", MAX_COLLATERALIZATION_PCT),
            });
        }
        Ok(())
    }
}
