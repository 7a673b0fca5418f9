//! Redemption settlement engine.
//!
//! Given a redemption event and a caller-chosen claim list, the engine
//! computes eligibility and reward amounts, deducts collateral, and pays
//! the aggregate reward in a single transfer. The whole call is
//! all-or-nothing: every check runs before the first mutation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ProtocolConfig;
use crate::error::{Error, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::governance::GovernedTarget;
use crate::registry::{RewarderId, RewarderRegistry};
use crate::token::{TokenAmount, TokenLedger};
use crate::utils::crypto::Address;

use super::redemption::Redemption;

// ═══════════════════════════════════════════════════════════════════════════════
// REWARD CLAIM
// ═══════════════════════════════════════════════════════════════════════════════

/// One caller-supplied (rewarder index, tier) reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaim {
    /// Index into the rewarder registry
    pub rewarder: RewarderId,
    /// Redemption-size tier to look up in the rewarder's schedule
    pub tier: u64,
}

impl RewardClaim {
    /// Parse a flattened `[rewarder, tier, rewarder, tier, ...]` sequence.
    ///
    /// The rewarder components must be strictly increasing across the
    /// list. A single linear scan enforces this; it makes referencing the
    /// same rewarder twice structurally impossible and rejects unsorted
    /// input as a side effect.
    pub fn parse_flattened(flattened: &[u64], max_claims: usize) -> Result<Vec<RewardClaim>> {
        if flattened.len() % 2 != 0 {
            return Err(Error::InvalidClaimList(format!(
                "expected (rewarderIndex, tier) pairs, got {} values",
                flattened.len()
            )));
        }
        let count = flattened.len() / 2;
        if count > max_claims {
            return Err(Error::InvalidClaimList(format!(
                "{} claims exceed maximum {}",
                count, max_claims
            )));
        }

        let mut claims = Vec::with_capacity(count);
        let mut previous: Option<u64> = None;
        for pair in flattened.chunks_exact(2) {
            let rewarder = pair[0];
            if let Some(prev) = previous {
                if rewarder <= prev {
                    return Err(Error::InvalidClaimList(
                        "rewarderIndexes must be strictly increasing".into(),
                    ));
                }
            }
            previous = Some(rewarder);
            claims.push(RewardClaim {
                rewarder,
                tier: pair[1],
            });
        }

        Ok(claims)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SETTLEMENT ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The settlement engine: rewarder registry plus administrative surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementEngine {
    /// The engine's own address (collateral custody)
    address: Address,
    /// Admin address; all privileged mutation is gated on this
    owner: Address,
    /// External collaborator wiring and limits
    config: ProtocolConfig,
    /// Rewarder records and their collateral
    registry: RewarderRegistry,
    /// Settlement event log
    events: EventLog,
}

impl SettlementEngine {
    /// Create an engine owned by `owner` (normally the timelock's address)
    pub fn new(address: Address, owner: Address, config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        let max_entries = config.max_schedule_entries;
        Ok(Self {
            address,
            owner,
            config,
            registry: RewarderRegistry::with_limits(address, max_entries),
            events: EventLog::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REDEMPTION SETTLEMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settle a redemption and distribute rewards.
    ///
    /// `flattened_claims` is a `[rewarderIndex, tier, ...]` sequence whose
    /// rewarder components must be strictly increasing. Rewarders whose
    /// threshold is not strictly above the redemption's live
    /// collateralization contribute zero without error; a rewarder whose
    /// collateral cannot cover its scheduled reward fails the entire call.
    /// The total must reach `minimum_acceptable_reward`, the caller's
    /// protection against front-running.
    ///
    /// Returns the aggregate reward paid to `caller`.
    #[allow(clippy::too_many_arguments)]
    pub fn redeem<R: Redemption>(
        &mut self,
        caller: Address,
        redemption: &R,
        flattened_claims: &[u64],
        minimum_acceptable_reward: TokenAmount,
        settlement_ledger: &mut dyn TokenLedger,
        reward_ledger: &mut dyn TokenLedger,
        now: u64,
    ) -> Result<TokenAmount> {
        let claims =
            RewardClaim::parse_flattened(flattened_claims, self.config.max_claims_per_redemption)?;
        let collateralization = redemption.collateralization_percentage();

        // Pure pass: compute every payout and check every precondition
        // before any state is touched.
        let mut total = TokenAmount::ZERO;
        let mut payouts: Vec<(RewarderId, TokenAmount)> = Vec::with_capacity(claims.len());
        for claim in &claims {
            let rewarder = self.registry.rewarder(claim.rewarder)?;

            if !redemption.is_operator(&rewarder.operator) {
                return Err(Error::OperatorMismatch {
                    rewarder: claim.rewarder,
                    operator: rewarder.operator.to_hex(),
                });
            }

            if !rewarder.rewards_at(collateralization) {
                debug!(
                    rewarder = claim.rewarder,
                    collateralization,
                    threshold = rewarder.min_collateralization_pct,
                    "redemption well-collateralized, no reward"
                );
                continue;
            }

            let reward = rewarder.schedule().reward_for(claim.tier);
            if reward.is_zero() {
                continue;
            }

            if rewarder.collateral() < reward {
                return Err(Error::InsufficientCollateral {
                    required: reward.units(),
                    available: rewarder.collateral().units(),
                });
            }

            total = total.checked_add(reward).ok_or(Error::Overflow {
                operation: "total reward".into(),
            })?;
            payouts.push((claim.rewarder, reward));
        }

        if total < minimum_acceptable_reward {
            return Err(Error::RewardBelowMinimum {
                total: total.units(),
                minimum: minimum_acceptable_reward.units(),
            });
        }

        // Pull the redemption's required settlement amount from the caller
        // (pass-through to the external settlement object). The caller must
        // have approved this engine as spender.
        let required = redemption.required_settlement_amount();
        if !required.is_zero() {
            settlement_ledger.transfer_from(
                &self.address,
                &caller,
                &redemption.settlement_address(),
                required,
            )?;
        }

        // Commit: deductions cannot fail, the pure pass verified each one
        // and a rewarder appears at most once per call.
        for (index, reward) in &payouts {
            self.registry.deduct_collateral(*index, *reward)?;
        }
        if !total.is_zero() {
            reward_ledger.transfer(&self.address, &caller, total)?;
        }

        info!(
            redeemer = %caller,
            total = %total,
            contributors = payouts.len(),
            "redemption settled"
        );
        self.events.push(ProtocolEvent::RedemptionSettled {
            redeemer: caller,
            total_reward: total,
            contributors: payouts.len(),
            timestamp: now,
        });

        Ok(total)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMINISTRATIVE SURFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Hand the engine to a new owner (owner only).
    ///
    /// This is the upgrade-permission handover; in production it is only
    /// reachable through the timelock's governed-call path.
    pub fn set_owner(&mut self, caller: Address, new_owner: Address, now: u64) -> Result<()> {
        self.require_owner(caller)?;
        self.apply_owner(new_owner, now);
        Ok(())
    }

    /// Replace the collaborator wiring and limits (owner only)
    pub fn set_config(&mut self, caller: Address, config: ProtocolConfig) -> Result<()> {
        self.require_owner(caller)?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn require_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(Error::Unauthorized(format!(
                "caller {} is not the engine owner",
                caller
            )));
        }
        Ok(())
    }

    fn apply_owner(&mut self, new_owner: Address, now: u64) {
        let previous = self.owner;
        self.owner = new_owner;
        info!(previous = %previous, current = %new_owner, "engine owner changed");
        self.events.push(ProtocolEvent::OwnerChanged {
            previous,
            current: new_owner,
            timestamp: now,
        });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// The engine's own address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner (upgrade authority)
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current configuration
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The rewarder registry
    pub fn registry(&self) -> &RewarderRegistry {
        &self.registry
    }

    /// Mutable access to the rewarder registry
    pub fn registry_mut(&mut self) -> &mut RewarderRegistry {
        &mut self.registry
    }

    /// Settlement event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GOVERNED CALL DISPATCH
// ═══════════════════════════════════════════════════════════════════════════════

/// Governed call signature for handing over the engine owner
pub const SIG_SET_OWNER: &str = "setOwner(address)";

/// Governed call signature for replacing the configuration
pub const SIG_SET_CONFIG: &str = "setConfig(bytes)";

impl GovernedTarget for SettlementEngine {
    fn target_address(&self) -> Address {
        self.address
    }

    // Authorization is the timelock's execute path; reaching this dispatch
    // already required an admin-gated, delay-surpassed queued call.
    fn governed_call(&mut self, signature: &str, data: &[u8], now: u64) -> Result<()> {
        match signature {
            SIG_SET_OWNER => {
                let new_owner = Address::from_slice(data)?;
                self.apply_owner(new_owner, now);
                Ok(())
            }
            SIG_SET_CONFIG => {
                let config: ProtocolConfig =
                    bincode::deserialize(data).map_err(|e| Error::Deserialization(e.to_string()))?;
                config.validate()?;
                self.config = config;
                Ok(())
            }
            other => Err(Error::UnknownGovernedCall(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::redemption::StaticRedemption;
    use crate::token::TokenBook;
    use proptest::prelude::*;

    fn engine() -> SettlementEngine {
        SettlementEngine::new(
            Address::derive("engine"),
            Address::derive("timelock"),
            ProtocolConfig::default(),
        )
        .unwrap()
    }

    struct Fixture {
        engine: SettlementEngine,
        reward_book: TokenBook,
        settlement_book: TokenBook,
        redeemer: Address,
        operator: Address,
    }

    /// Engine with one rewarder: schedule {1: 20}, threshold 135%, 500 collateral.
    fn fixture() -> Fixture {
        let mut engine = engine();
        let mut reward_book = TokenBook::new("WORK");
        let mut settlement_book = TokenBook::new("SETTLE");

        let sponsor = Address::derive("sponsor");
        let operator = Address::derive("operator");
        let redeemer = Address::derive("redeemer");
        let custody = engine.address();

        reward_book.mint(sponsor, TokenAmount::from_units(500)).unwrap();
        reward_book.approve(&sponsor, &custody, TokenAmount::from_units(500)).unwrap();
        engine
            .registry_mut()
            .add_rewarder(
                sponsor,
                operator,
                TokenAmount::from_units(500),
                &[1, 20],
                135,
                &mut reward_book,
                0,
            )
            .unwrap();

        settlement_book.mint(redeemer, TokenAmount::from_units(1000)).unwrap();
        settlement_book.approve(&redeemer, &custody, TokenAmount::from_units(1000)).unwrap();

        Fixture {
            engine,
            reward_book,
            settlement_book,
            redeemer,
            operator,
        }
    }

    fn redemption_at(fx: &Fixture, collateralization_pct: u64) -> StaticRedemption {
        StaticRedemption::new(
            TokenAmount::from_units(100),
            collateralization_pct,
            [fx.operator],
            Address::derive("vending"),
        )
    }

    #[test]
    fn test_parse_rejects_repeated_rewarder() {
        let result = RewardClaim::parse_flattened(&[0, 1, 0, 1], 32);
        assert_eq!(
            result,
            Err(Error::InvalidClaimList(
                "rewarderIndexes must be strictly increasing".into()
            ))
        );
    }

    #[test]
    fn test_parse_rejects_unsorted() {
        assert!(RewardClaim::parse_flattened(&[2, 1, 1, 1], 32).is_err());
    }

    #[test]
    fn test_parse_accepts_increasing() {
        let claims = RewardClaim::parse_flattened(&[0, 5, 3, 1, 7, 0], 32).unwrap();
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[1], RewardClaim { rewarder: 3, tier: 1 });
    }

    #[test]
    fn test_parse_rejects_odd_length() {
        assert!(RewardClaim::parse_flattened(&[0, 1, 2], 32).is_err());
    }

    #[test]
    fn test_redeem_pays_eligible_rewarder() {
        let mut fx = fixture();
        let redemption = redemption_at(&fx, 30);

        let total = fx
            .engine
            .redeem(
                fx.redeemer,
                &redemption,
                &[0, 1],
                TokenAmount::ZERO,
                &mut fx.settlement_book,
                &mut fx.reward_book,
                10,
            )
            .unwrap();

        assert_eq!(total, TokenAmount::from_units(20));
        assert_eq!(fx.reward_book.balance_of(&fx.redeemer), TokenAmount::from_units(20));
        assert_eq!(
            fx.engine.registry().collateral_of(0).unwrap(),
            TokenAmount::from_units(480)
        );
        // Settlement amount forwarded
        assert_eq!(
            fx.settlement_book.balance_of(&Address::derive("vending")),
            TokenAmount::from_units(100)
        );
    }

    #[test]
    fn test_well_collateralized_redemption_pays_nothing() {
        let mut fx = fixture();
        // 140% live >= 135% threshold: reward gate closed
        let redemption = redemption_at(&fx, 140);

        let total = fx
            .engine
            .redeem(
                fx.redeemer,
                &redemption,
                &[0, 1],
                TokenAmount::ZERO,
                &mut fx.settlement_book,
                &mut fx.reward_book,
                10,
            )
            .unwrap();

        assert_eq!(total, TokenAmount::ZERO);
        assert_eq!(
            fx.engine.registry().collateral_of(0).unwrap(),
            TokenAmount::from_units(500)
        );
    }

    #[test]
    fn test_minimum_reward_floor_leaves_state_untouched() {
        let mut fx = fixture();
        let redemption = redemption_at(&fx, 140);
        let redeemer_before = fx.settlement_book.balance_of(&fx.redeemer);

        let result = fx.engine.redeem(
            fx.redeemer,
            &redemption,
            &[0, 1],
            TokenAmount::from_units(20),
            &mut fx.settlement_book,
            &mut fx.reward_book,
            10,
        );

        assert!(matches!(result, Err(Error::RewardBelowMinimum { total: 0, minimum: 20 })));
        assert_eq!(fx.settlement_book.balance_of(&fx.redeemer), redeemer_before);
        assert_eq!(
            fx.engine.registry().collateral_of(0).unwrap(),
            TokenAmount::from_units(500)
        );
        assert_eq!(fx.reward_book.balance_of(&fx.redeemer), TokenAmount::ZERO);
    }

    #[test]
    fn test_operator_mismatch_fails() {
        let mut fx = fixture();
        let redemption = StaticRedemption::new(
            TokenAmount::from_units(100),
            30,
            [Address::derive("unrelated-operator")],
            Address::derive("vending"),
        );

        let result = fx.engine.redeem(
            fx.redeemer,
            &redemption,
            &[0, 1],
            TokenAmount::ZERO,
            &mut fx.settlement_book,
            &mut fx.reward_book,
            10,
        );

        assert!(matches!(result, Err(Error::OperatorMismatch { rewarder: 0, .. })));
    }

    #[test]
    fn test_insufficient_rewarder_collateral_fails_whole_call() {
        let mut fx = fixture();
        let sponsor = Address::derive("sponsor");
        // Drain collateral below the scheduled reward
        fx.engine
            .registry_mut()
            .withdraw(sponsor, 0, TokenAmount::from_units(490), &mut fx.reward_book, 5)
            .unwrap();

        let redemption = redemption_at(&fx, 30);
        let result = fx.engine.redeem(
            fx.redeemer,
            &redemption,
            &[0, 1],
            TokenAmount::ZERO,
            &mut fx.settlement_book,
            &mut fx.reward_book,
            10,
        );

        assert!(matches!(result, Err(Error::InsufficientCollateral { required: 20, available: 10 })));
        // Fail-fast: nothing moved
        assert_eq!(
            fx.settlement_book.balance_of(&Address::derive("vending")),
            TokenAmount::ZERO
        );
    }

    #[test]
    fn test_empty_claim_list_is_valid() {
        let mut fx = fixture();
        let redemption = redemption_at(&fx, 30);

        let total = fx
            .engine
            .redeem(
                fx.redeemer,
                &redemption,
                &[],
                TokenAmount::ZERO,
                &mut fx.settlement_book,
                &mut fx.reward_book,
                10,
            )
            .unwrap();

        assert_eq!(total, TokenAmount::ZERO);
    }

    #[test]
    fn test_set_owner_requires_owner() {
        let mut engine = engine();
        let stranger = Address::derive("stranger");

        let result = engine.set_owner(stranger, stranger, 0);
        assert!(matches!(result, Err(Error::Unauthorized(_))));

        engine.set_owner(Address::derive("timelock"), stranger, 0).unwrap();
        assert_eq!(engine.owner(), stranger);
    }

    #[test]
    fn test_governed_call_set_owner() {
        let mut engine = engine();
        let new_owner = Address::derive("new-owner");

        engine
            .governed_call(SIG_SET_OWNER, new_owner.as_bytes(), 7)
            .unwrap();

        assert_eq!(engine.owner(), new_owner);
        assert_eq!(engine.events().recent(1)[0].event_type(), "OwnerChanged");
    }

    #[test]
    fn test_governed_call_unknown_signature() {
        let mut engine = engine();
        let result = engine.governed_call("selfdestruct()", &[], 0);
        assert!(matches!(result, Err(Error::UnknownGovernedCall(_))));
    }

    proptest! {
        #[test]
        fn prop_strictly_increasing_accepted(start in 0u64..100, steps in proptest::collection::vec(1u64..10, 0..16)) {
            let mut flattened = Vec::new();
            let mut index = start;
            for step in &steps {
                flattened.push(index);
                flattened.push(1);
                index += step;
            }
            prop_assert!(RewardClaim::parse_flattened(&flattened, 32).is_ok());
        }

        #[test]
        fn prop_any_repeat_rejected(indexes in proptest::collection::vec(0u64..8, 2..16)) {
            let mut flattened = Vec::new();
            for index in &indexes {
                flattened.push(*index);
                flattened.push(1);
            }
            let sorted_strict = indexes.windows(2).all(|w| w[0] < w[1]);
            let parsed = RewardClaim::parse_flattened(&flattened, 32);
            prop_assert_eq!(parsed.is_ok(), sorted_strict);
        }
    }
}
