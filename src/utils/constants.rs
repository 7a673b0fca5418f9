//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a hash in bytes
pub const HASH_LENGTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELOCK CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum timelock delay in seconds (2 days)
pub const TIMELOCK_MINIMUM_DELAY: u64 = 2 * 24 * 60 * 60;

/// Maximum timelock delay in seconds (30 days)
pub const TIMELOCK_MAXIMUM_DELAY: u64 = 30 * 24 * 60 * 60;

/// Grace period after eta during which a queued call stays executable (14 days)
pub const TIMELOCK_GRACE_PERIOD: u64 = 14 * 24 * 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum number of (tier, reward) entries accepted per schedule update
pub const MAX_SCHEDULE_ENTRIES: usize = 64;

/// Maximum number of reward claims accepted per redemption
pub const MAX_CLAIMS_PER_REDEMPTION: usize = 32;

/// Maximum minimum-collateralization threshold accepted for a rewarder - 10000%
pub const MAX_COLLATERALIZATION_PCT: u64 = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum events kept in an in-memory event log before pruning
pub const MAX_EVENTS_RETAINED: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// MAINNET COLLABORATOR ADDRESSES
// ═══════════════════════════════════════════════════════════════════════════════
// Snapshot of the external contracts the production deployment is wired to.

/// Reward (work) token contract
pub const MAINNET_REWARD_TOKEN: &str = "0x85Eee30c52B0b379b046Fb0F85F4f3Dc3009aFEC";

/// Settlement (redemption) token contract
pub const MAINNET_SETTLEMENT_TOKEN: &str = "0x8dAEBADE922dF735c38C80C7eBD708Af50815fAa";

/// Vending machine handling settlement pass-through
pub const MAINNET_VENDING_MACHINE: &str = "0x526c08E5532A9308b3fb33b7968eF78a5005d2AC";

/// Deposit token registry used to resolve redemption objects
pub const MAINNET_DEPOSIT_TOKEN: &str = "0x10B66Bd1e3b5a936B7f8Dbc5976004311037Cdf0";
