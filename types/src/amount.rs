//! Token amounts.
//!
//! Amounts are represented as integers of base units (u128) to avoid floating-point errors.
//! One display unit is [`BASE_UNITS_PER_DISPLAY_UNIT`] base units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base units per display unit (the chain's coin has 6 decimals).
pub const BASE_UNITS_PER_DISPLAY_UNIT: u128 = 1_000_000;

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Apply a signed delta to an unsigned amount. `None` on overflow or underflow.
pub fn apply_delta(amount: u128, delta: i128) -> Option<u128> {
    if delta >= 0 {
        amount.checked_add(delta.unsigned_abs())
    } else {
        amount.checked_sub(delta.unsigned_abs())
    }
}

/// Convert base units into whole display units, saturating at `u64::MAX`.
pub fn to_display_units(amount: u128) -> u64 {
    u64::try_from(amount / BASE_UNITS_PER_DISPLAY_UNIT).unwrap_or(u64::MAX)
}
