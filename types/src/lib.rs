//! Fundamental types for the Axiome referral engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, timestamps, coin amounts, fractions, and the narrow
//! interfaces of the chain modules the referral engine collaborates with.

pub mod address;
pub mod amount;
pub mod error;
pub mod fraction;
pub mod interfaces;
pub mod time;

pub use address::AccountId;
pub use amount::{apply_delta, to_display_units, Coin, BASE_UNITS_PER_DISPLAY_UNIT};
pub use error::TypesError;
pub use fraction::Fraction;
pub use interfaces::{AddressCodec, BankKeeper, CollaboratorError, Input, Output, StakingKeeper};
pub use time::Timestamp;
