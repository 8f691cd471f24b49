//! Module parameters.

use serde::{Deserialize, Serialize};

use axm_types::Fraction;

use crate::{ReferralError, MAX_DEPTH};

/// Seven days.
pub const DEFAULT_STATUS_DOWNGRADE_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Share of a delegation paid to the ancestor at each level (1..=14).
    pub delegating_award: [Fraction; MAX_DEPTH],
    /// Grace period between failing status requirements and the downgrade.
    pub status_downgrade_period_secs: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            delegating_award: [
                Fraction::percent(5),
                Fraction::percent(1),
                Fraction::percent(2),
                Fraction::percent(1),
                Fraction::percent(1),
                Fraction::percent(1),
                Fraction::percent(1),
                Fraction::percent(1),
                Fraction::permille(7),
                Fraction::permille(5),
                Fraction::permille(3),
                Fraction::permille(2),
                Fraction::permille(2),
                Fraction::permille(1),
            ],
            status_downgrade_period_secs: DEFAULT_STATUS_DOWNGRADE_PERIOD_SECS,
        }
    }
}

impl Params {
    /// Sum of all per-level awards.
    pub fn total_award(&self) -> Result<Fraction, ReferralError> {
        self.delegating_award
            .iter()
            .try_fold(Fraction::ZERO, |acc, f| acc.checked_add(*f))
            .ok_or(ReferralError::Overflow("award total"))
    }

    pub fn validate(&self) -> Result<(), ReferralError> {
        let total = self.total_award()?;
        if total >= Fraction::ONE {
            return Err(ReferralError::InvalidParams(format!(
                "total network award must be less than 100% (got {total})"
            )));
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, ReferralError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ReferralError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
