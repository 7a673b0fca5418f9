//! Protocol events for state change notifications.
//!
//! Events are emitted for all significant state changes, enabling clients
//! to track activity and react accordingly. Each component keeps a bounded
//! in-memory [`EventLog`].

use serde::{Deserialize, Serialize};

use crate::token::TokenAmount;
use crate::utils::constants::MAX_EVENTS_RETAINED;
use crate::utils::crypto::{Address, Hash};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// All protocol event types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProtocolEvent {
    // Registry events
    /// A new rewarder was registered
    RewarderAdded {
        /// Index of the new record
        index: u64,
        /// Record owner
        owner: Address,
        /// Operator identity checked at settlement time
        operator: Address,
        /// Initial collateral deposit
        deposit: TokenAmount,
        /// Timestamp
        timestamp: u64,
    },
    /// A rewarder's schedule was updated
    ScheduleUpdated {
        /// Rewarder index
        index: u64,
        /// Number of (tier, reward) entries applied
        entries: usize,
        /// Timestamp
        timestamp: u64,
    },
    /// A rewarder's collateralization threshold was changed
    MinimumCollateralizationChanged {
        /// Rewarder index
        index: u64,
        /// New threshold percentage
        value: u64,
        /// Timestamp
        timestamp: u64,
    },
    /// Collateral was added to a rewarder
    CollateralToppedUp {
        /// Rewarder index
        index: u64,
        /// Amount added
        amount: TokenAmount,
        /// Timestamp
        timestamp: u64,
    },
    /// Collateral was withdrawn by the owner
    CollateralWithdrawn {
        /// Rewarder index
        index: u64,
        /// Amount withdrawn
        amount: TokenAmount,
        /// Timestamp
        timestamp: u64,
    },

    // Settlement events
    /// A redemption was settled and rewards paid
    RedemptionSettled {
        /// Redeemer who triggered the settlement
        redeemer: Address,
        /// Aggregate reward paid out
        total_reward: TokenAmount,
        /// Number of rewarders that contributed
        contributors: usize,
        /// Timestamp
        timestamp: u64,
    },
    /// The engine's owner (upgrade authority) changed
    OwnerChanged {
        /// Previous owner
        previous: Address,
        /// New owner
        current: Address,
        /// Timestamp
        timestamp: u64,
    },

    // Timelock events
    /// A call was queued behind the timelock
    CallQueued {
        /// Call identity
        id: Hash,
        /// Earliest executable timestamp
        eta: u64,
        /// Timestamp
        timestamp: u64,
    },
    /// A queued call was cancelled
    CallCancelled {
        /// Call identity
        id: Hash,
        /// Timestamp
        timestamp: u64,
    },
    /// A queued call was executed
    CallExecuted {
        /// Call identity
        id: Hash,
        /// Timestamp
        timestamp: u64,
    },
}

impl ProtocolEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RewarderAdded { .. } => "RewarderAdded",
            Self::ScheduleUpdated { .. } => "ScheduleUpdated",
            Self::MinimumCollateralizationChanged { .. } => "MinimumCollateralizationChanged",
            Self::CollateralToppedUp { .. } => "CollateralToppedUp",
            Self::CollateralWithdrawn { .. } => "CollateralWithdrawn",
            Self::RedemptionSettled { .. } => "RedemptionSettled",
            Self::OwnerChanged { .. } => "OwnerChanged",
            Self::CallQueued { .. } => "CallQueued",
            Self::CallCancelled { .. } => "CallCancelled",
            Self::CallExecuted { .. } => "CallExecuted",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::RewarderAdded { timestamp, .. }
            | Self::ScheduleUpdated { timestamp, .. }
            | Self::MinimumCollateralizationChanged { timestamp, .. }
            | Self::CollateralToppedUp { timestamp, .. }
            | Self::CollateralWithdrawn { timestamp, .. }
            | Self::RedemptionSettled { timestamp, .. }
            | Self::OwnerChanged { timestamp, .. }
            | Self::CallQueued { timestamp, .. }
            | Self::CallCancelled { timestamp, .. }
            | Self::CallExecuted { timestamp, .. } => *timestamp,
        }
    }

    /// Compute event hash
    pub fn hash(&self) -> Hash {
        let data = bincode::serialize(self).unwrap_or_default();
        Hash::sha256(&data)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounded in-memory event log with FIFO pruning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ProtocolEvent>,
    max_events: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create a new log with the default retention bound
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: MAX_EVENTS_RETAINED,
        }
    }

    /// Create a log with a custom retention bound
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Record an event (pruning oldest entries past the bound)
    pub fn push(&mut self, event: ProtocolEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }

    /// All retained events, oldest first
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Most recent `limit` events, newest first
    pub fn recent(&self, limit: usize) -> Vec<&ProtocolEvent> {
        self.events.iter().rev().take(limit).collect()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
