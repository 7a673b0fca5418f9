//! Delay-enforced execution of privileged calls.
//!
//! Per call identity the state machine is
//! `NonExistent → Queued → {Executed | Cancelled}`, with `Queued` further
//! gated by `eta` and a grace deadline. Identity is the hash of all call
//! fields: two calls with identical fields collide by design, and a
//! consumed identity may be queued again.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::ProtocolConfig;
use crate::error::{Error, Result};
use crate::events::{EventLog, ProtocolEvent};
use crate::utils::constants::{
    TIMELOCK_GRACE_PERIOD, TIMELOCK_MAXIMUM_DELAY, TIMELOCK_MINIMUM_DELAY,
};
use crate::utils::crypto::{Address, Hash};

use super::GovernedTarget;

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELOCK CALL
// ═══════════════════════════════════════════════════════════════════════════════

/// One queued privileged call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockCall {
    /// Contract the call is addressed to
    pub target: Address,
    /// Native value forwarded with the call
    pub value: u64,
    /// Function signature, e.g. `"setOwner(address)"`
    pub signature: String,
    /// Encoded arguments
    pub data: Vec<u8>,
    /// Earliest executable timestamp
    pub eta: u64,
}

impl TimelockCall {
    /// Create a call
    pub fn new(
        target: Address,
        value: u64,
        signature: impl Into<String>,
        data: Vec<u8>,
        eta: u64,
    ) -> Self {
        Self {
            target,
            value,
            signature: signature.into(),
            data,
            eta,
        }
    }

    /// Identity hash over all five fields
    pub fn id(&self) -> Hash {
        let encoded = bincode::serialize(self).unwrap_or_default();
        Hash::sha256(&encoded)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Delay-enforced governance controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timelock {
    /// Admin allowed to queue, cancel, and execute
    admin: Address,
    /// Address allowed to claim admin via `accept_admin`
    pending_admin: Option<Address>,
    /// Mandatory delay between queue and execution, in seconds
    delay: u64,
    /// Queued calls by identity
    queued: HashMap<Hash, TimelockCall>,
    /// Governance event log
    events: EventLog,
}

impl Timelock {
    /// Create a timelock controlled by `admin` with the given delay.
    ///
    /// The delay must sit inside the production bounds
    /// `[TIMELOCK_MINIMUM_DELAY, TIMELOCK_MAXIMUM_DELAY]`.
    pub fn new(admin: Address, delay: u64) -> Result<Self> {
        Self::validate_delay(delay)?;
        Ok(Self {
            admin,
            pending_admin: None,
            delay,
            queued: HashMap::new(),
            events: EventLog::new(),
        })
    }

    /// Create a timelock whose delay comes from a protocol configuration.
    ///
    /// Delay bounds here are the configuration's own
    /// ([`ProtocolConfig::validate`]), not the production floor, so a
    /// preset like [`ProtocolConfig::testnet`] can run short delays when
    /// exercising governance flows locally.
    pub fn from_config(admin: Address, config: &ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            admin,
            pending_admin: None,
            delay: config.timelock_delay,
            queued: HashMap::new(),
            events: EventLog::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUEUE / CANCEL / EXECUTE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Queue a call (admin only).
    ///
    /// Requires `eta >= now + delay`. Returns the call identity.
    pub fn queue_transaction(
        &mut self,
        caller: Address,
        call: TimelockCall,
        now: u64,
    ) -> Result<Hash> {
        self.require_admin(caller)?;

        let earliest = now.checked_add(self.delay).ok_or(Error::Overflow {
            operation: "queue eta".into(),
        })?;
        if call.eta < earliest {
            return Err(Error::EtaTooSoon {
                eta: call.eta,
                earliest,
            });
        }

        let id = call.id();
        info!(id = %id.short(), eta = call.eta, signature = %call.signature, "transaction queued");
        self.events.push(ProtocolEvent::CallQueued {
            id,
            eta: call.eta,
            timestamp: now,
        });
        self.queued.insert(id, call);

        Ok(id)
    }

    /// Cancel a queued call (admin only).
    ///
    /// Unconditionally clears the queued state for the matching identity.
    pub fn cancel_transaction(&mut self, caller: Address, call: &TimelockCall, now: u64) -> Result<()> {
        self.require_admin(caller)?;

        let id = call.id();
        if self.queued.remove(&id).is_some() {
            info!(id = %id.short(), "transaction cancelled");
            self.events.push(ProtocolEvent::CallCancelled { id, timestamp: now });
        } else {
            warn!(id = %id.short(), "cancel for unqueued transaction");
        }
        Ok(())
    }

    /// Execute a queued call against `target` (admin only).
    ///
    /// Requires the call to be queued, `now >= eta`, and
    /// `now <= eta + GRACE_PERIOD`. The queued state is consumed only
    /// when the dispatched call succeeds; a failed dispatch leaves the
    /// call queued and retryable within its grace window.
    pub fn execute_transaction(
        &mut self,
        caller: Address,
        call: &TimelockCall,
        now: u64,
        target: &mut dyn GovernedTarget,
    ) -> Result<()> {
        self.require_admin(caller)?;

        let id = call.id();
        if !self.queued.contains_key(&id) {
            return Err(Error::TimelockNotQueued(id.to_hex()));
        }
        if now < call.eta {
            return Err(Error::TimelockNotReady { now, eta: call.eta });
        }
        let expiry = call.eta.saturating_add(TIMELOCK_GRACE_PERIOD);
        if now > expiry {
            return Err(Error::TimelockStale { now, expiry });
        }
        if call.target != target.target_address() {
            return Err(Error::TargetMismatch {
                expected: call.target.to_hex(),
                got: target.target_address().to_hex(),
            });
        }

        target.governed_call(&call.signature, &call.data, now)?;
        self.queued.remove(&id);

        info!(id = %id.short(), signature = %call.signature, "transaction executed");
        self.events.push(ProtocolEvent::CallExecuted { id, timestamp: now });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Change the mandatory delay (admin only, bounds enforced)
    pub fn set_delay(&mut self, caller: Address, new_delay: u64) -> Result<()> {
        self.require_admin(caller)?;
        Self::validate_delay(new_delay)?;
        self.delay = new_delay;
        Ok(())
    }

    /// Nominate a new admin (admin only); takes effect on `accept_admin`
    pub fn set_pending_admin(&mut self, caller: Address, pending: Address) -> Result<()> {
        self.require_admin(caller)?;
        self.pending_admin = Some(pending);
        Ok(())
    }

    /// Claim admin rights (pending admin only)
    pub fn accept_admin(&mut self, caller: Address) -> Result<()> {
        if self.pending_admin != Some(caller) {
            return Err(Error::Unauthorized(
                "Call must come from pending admin".into(),
            ));
        }
        self.admin = caller;
        self.pending_admin = None;
        info!(admin = %caller, "timelock admin accepted");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Whether a call identity is currently queued
    pub fn is_queued(&self, id: &Hash) -> bool {
        self.queued.contains_key(id)
    }

    /// Eta of a queued call identity
    pub fn eta_of(&self, id: &Hash) -> Option<u64> {
        self.queued.get(id).map(|c| c.eta)
    }

    /// Number of currently queued calls
    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Current admin
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Current mandatory delay in seconds
    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Governance event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    fn require_admin(&self, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(Error::Unauthorized("Call must come from admin".into()));
        }
        Ok(())
    }

    fn validate_delay(delay: u64) -> Result<()> {
        if delay < TIMELOCK_MINIMUM_DELAY || delay > TIMELOCK_MAXIMUM_DELAY {
            return Err(Error::DelayOutOfBounds {
                delay,
                min: TIMELOCK_MINIMUM_DELAY,
                max: TIMELOCK_MAXIMUM_DELAY,
            });
        }
        Ok(())
    }
}
