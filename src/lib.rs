//! # Redemption Rewards Protocol
//!
//! Collateral-backed reward distribution for a redemption process, gated
//! by a timelocked governance controller.
//!
//! ## Architecture
//!
//! The protocol consists of several core modules:
//!
//! - **Registry**: rewarder records, collateral custody, and sparse
//!   tier-keyed reward schedules
//! - **Settlement**: the redemption settlement engine that validates claim
//!   lists and distributes rewards atomically
//! - **Governance**: the timelock controller gating every privileged
//!   change to the engine's administrative surface
//! - **Token**: the external fungible-token seam and an in-crate ledger
//!   for tests and simulation
//!
//! ## Execution model
//!
//! One state-mutating call runs to completion before the next begins; all
//! operations are all-or-nothing. Ordering between independent calls is
//! adversarial, which is why the engine enforces strictly-increasing claim
//! lists and a caller-supplied minimum-reward floor.
//!
//! ## Example
//!
//! ```rust,ignore
//! use redemption_rewards::prelude::*;
//!
//! let mut engine = SettlementEngine::new(engine_addr, timelock_addr, ProtocolConfig::mainnet())?;
//! engine.registry_mut().add_rewarder(owner, operator, deposit, &[1, 10], 135, &mut ledger, now)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod config;
pub mod error;
pub mod events;
pub mod governance;
pub mod registry;
pub mod settlement;
pub mod token;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ProtocolConfig;
    pub use crate::error::{Error, Result};
    pub use crate::events::{EventLog, ProtocolEvent};
    pub use crate::governance::{GovernedTarget, Timelock, TimelockCall};
    pub use crate::registry::{Rewarder, RewarderId, RewarderRegistry, RewardSchedule};
    pub use crate::settlement::{
        Redemption, RewardClaim, SettlementEngine, StaticRedemption, SIG_SET_OWNER,
    };
    pub use crate::token::{TokenAmount, TokenBook, TokenLedger};
    pub use crate::utils::crypto::{Address, Hash};
}

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "redemption-rewards";
