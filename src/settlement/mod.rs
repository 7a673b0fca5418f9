//! Redemption settlement.
//!
//! The engine resolves a redemption's live parameters, validates the
//! caller's claim list, and distributes collateral-backed rewards
//! atomically.

pub mod engine;
pub mod redemption;

pub use engine::{RewardClaim, SettlementEngine, SIG_SET_CONFIG, SIG_SET_OWNER};
pub use redemption::{Redemption, StaticRedemption};
