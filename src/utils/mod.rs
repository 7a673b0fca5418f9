//! Utility modules shared across the protocol.

pub mod constants;
pub mod crypto;

pub use constants::*;
pub use crypto::{Address, Hash};
