//! Protocol configuration.
//!
//! Configuration bundles the external collaborator addresses the engine is
//! wired to plus the operational limits. Presets exist for mainnet (the
//! deployed snapshot) and testnet (short delays for exercising timelock
//! flows).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::constants::*;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for the settlement engine and its governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Reward token contract (collateral is posted and paid in this token)
    pub reward_token: Address,
    /// Settlement token contract (the redemption's required amount is pulled in this token)
    pub settlement_token: Address,
    /// Vending machine the settlement amount is forwarded through
    pub vending_machine: Address,
    /// Deposit-token registry used to resolve redemption objects
    pub deposit_token: Address,
    /// Maximum (tier, reward) entries per schedule update
    pub max_schedule_entries: usize,
    /// Maximum claims per redemption call
    pub max_claims_per_redemption: usize,
    /// Timelock delay in seconds
    pub timelock_delay: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            reward_token: Address::ZERO,
            settlement_token: Address::ZERO,
            vending_machine: Address::ZERO,
            deposit_token: Address::ZERO,
            max_schedule_entries: MAX_SCHEDULE_ENTRIES,
            max_claims_per_redemption: MAX_CLAIMS_PER_REDEMPTION,
            timelock_delay: TIMELOCK_MINIMUM_DELAY,
        }
    }
}

impl ProtocolConfig {
    /// Configuration wired to the mainnet collaborator contracts
    pub fn mainnet() -> Self {
        Self {
            reward_token: Address::from_hex(MAINNET_REWARD_TOKEN)
                .expect("mainnet reward token address is valid"),
            settlement_token: Address::from_hex(MAINNET_SETTLEMENT_TOKEN)
                .expect("mainnet settlement token address is valid"),
            vending_machine: Address::from_hex(MAINNET_VENDING_MACHINE)
                .expect("mainnet vending machine address is valid"),
            deposit_token: Address::from_hex(MAINNET_DEPOSIT_TOKEN)
                .expect("mainnet deposit token address is valid"),
            ..Default::default()
        }
    }

    /// Configuration for testnet (short timelock delay)
    pub fn testnet() -> Self {
        Self {
            timelock_delay: 60,
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_schedule_entries == 0 {
            return Err(Error::InvalidParameter {
                name: "max_schedule_entries".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_claims_per_redemption == 0 {
            return Err(Error::InvalidParameter {
                name: "max_claims_per_redemption".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.timelock_delay == 0 || self.timelock_delay > TIMELOCK_MAXIMUM_DELAY {
            return Err(Error::DelayOutOfBounds {
                delay: self.timelock_delay,
                min: 1,
                max: TIMELOCK_MAXIMUM_DELAY,
            });
        }
        Ok(())
    }
}
