//! Nullable infrastructure for deterministic testing.
//!
//! The referral keeper talks to the bank, staking and address-codec modules
//! and to the host's metered store only through traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Record what they were asked to do
//! - Can be told to fail
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod clock;
pub mod codec;
pub mod staking;
pub mod store;

pub use bank::{BankCall, NullBank};
pub use clock::NullClock;
pub use codec::NullAddressCodec;
pub use staking::NullStaking;
pub use store::MeteredStore;
