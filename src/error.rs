//! Error types for the redemption rewards protocol.
//!
//! This module defines all error types used throughout the protocol,
//! providing clear and actionable error messages.

use thiserror::Error;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Caller is not the required owner/admin
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════
    // Registry Errors
    // ═══════════════════════════════════════════════════════════════════

    /// No rewarder registered under this index
    #[error("Rewarder not found: index {0}")]
    RewarderNotFound(u64),

    /// Payout or withdrawal would drive a rewarder's collateral negative
    #[error("Insufficient collateral: required {required}, available {available}")]
    InsufficientCollateral {
        /// Required collateral amount
        required: u64,
        /// Available collateral amount
        available: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Settlement Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Claim list is malformed or not strictly increasing
    #[error("Invalid claim list: {0}")]
    InvalidClaimList(String),

    /// Rewarder's operator is not a member of the redemption's operator set
    #[error("Operator mismatch: rewarder {rewarder} operator {operator} is not a member of the redemption")]
    OperatorMismatch {
        /// Offending rewarder index
        rewarder: u64,
        /// Registered operator address (hex)
        operator: String,
    },

    /// Total computed reward is below the caller's floor
    #[error("Reward does not reach minimum: total {total}, minimum {minimum}")]
    RewardBelowMinimum {
        /// Total computed reward
        total: u64,
        /// Caller-supplied floor
        minimum: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Token Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Account balance cannot cover the transfer
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Required amount
        required: u64,
        /// Available amount
        available: u64,
    },

    /// Spender allowance cannot cover the transfer
    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance {
        /// Required amount
        required: u64,
        /// Approved amount
        approved: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Timelock Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Execute attempted on a call that is not queued
    #[error("Transaction hasn't been queued: {0}")]
    TimelockNotQueued(String),

    /// Execute attempted before eta
    #[error("Transaction hasn't surpassed time lock: now {now}, eta {eta}")]
    TimelockNotReady {
        /// Current timestamp
        now: u64,
        /// Earliest executable timestamp
        eta: u64,
    },

    /// Execute attempted after the grace period expired
    #[error("Transaction is stale: now {now}, expired at {expiry}")]
    TimelockStale {
        /// Current timestamp
        now: u64,
        /// End of the grace window
        expiry: u64,
    },

    /// Queue attempted with an eta that does not satisfy the delay
    #[error("Estimated execution time must satisfy delay: eta {eta}, earliest {earliest}")]
    EtaTooSoon {
        /// Supplied eta
        eta: u64,
        /// Earliest acceptable eta
        earliest: u64,
    },

    /// Configured delay outside the allowed bounds
    #[error("Delay {delay} outside bounds [{min}, {max}]")]
    DelayOutOfBounds {
        /// Requested delay
        delay: u64,
        /// Minimum allowed delay
        min: u64,
        /// Maximum allowed delay
        max: u64,
    },

    /// Call targets a different contract than the one being executed against
    #[error("Call target {expected} does not match executing target {got}")]
    TargetMismatch {
        /// Target recorded in the call
        expected: String,
        /// Address of the contract being executed against
        got: String,
    },

    /// Governed call signature is not part of the administrative surface
    #[error("Unknown governed call: {0}")]
    UnknownGovernedCall(String),

    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error is recoverable by resubmitting with
    /// corrected parameters
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Internal(_)
                | Error::Overflow { .. }
                | Error::Serialization(_)
                | Error::Deserialization(_)
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Authorization errors: 1xxx
            Error::Unauthorized(_) => 1001,

            // Registry errors: 2xxx
            Error::RewarderNotFound(_) => 2001,
            Error::InsufficientCollateral { .. } => 2002,

            // Settlement errors: 3xxx
            Error::InvalidClaimList(_) => 3001,
            Error::OperatorMismatch { .. } => 3002,
            Error::RewardBelowMinimum { .. } => 3003,

            // Token errors: 4xxx
            Error::InsufficientBalance { .. } => 4001,
            Error::InsufficientAllowance { .. } => 4002,

            // Timelock errors: 5xxx
            Error::TimelockNotQueued(_) => 5001,
            Error::TimelockNotReady { .. } => 5002,
            Error::TimelockStale { .. } => 5003,
            Error::EtaTooSoon { .. } => 5004,
            Error::DelayOutOfBounds { .. } => 5005,
            Error::TargetMismatch { .. } => 5006,
            Error::UnknownGovernedCall(_) => 5007,

            // Validation errors: 6xxx
            Error::InvalidParameter { .. } => 6001,
            Error::ZeroAmount => 6002,
            Error::Overflow { .. } => 6003,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,

            // Internal errors: 9xxx
            Error::Internal(_) => 9001,
        }
    }
}
