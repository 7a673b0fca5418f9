//! Timelocked governance.
//!
//! Every privileged change to the settlement engine's administrative
//! surface goes through the [`Timelock`]: queued by the admin, executable
//! only after a mandatory delay and before a grace deadline. Decoupling
//! proposal from execution gives affected parties a public, bounded window
//! to react before any privileged change takes effect.

pub mod timelock;

pub use timelock::{Timelock, TimelockCall};

use crate::error::Result;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// GOVERNED TARGET
// ═══════════════════════════════════════════════════════════════════════════════

/// A contract whose administrative surface is reachable through the timelock.
///
/// The dispatch itself carries the authorization: a call only arrives here
/// through an admin-queued, delay-surpassed timelock execution.
pub trait GovernedTarget {
    /// The target's own address, matched against the queued call's target
    fn target_address(&self) -> Address;

    /// Apply the call described by `signature` and `data`
    fn governed_call(&mut self, signature: &str, data: &[u8], now: u64) -> Result<()>;
}
