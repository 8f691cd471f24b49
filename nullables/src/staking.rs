//! Nullable staking module.

use axm_types::{CollaboratorError, StakingKeeper};

/// Answers staking lookups with fixed values.
pub struct NullStaking {
    bond_denom: String,
}

impl NullStaking {
    pub fn new(bond_denom: impl Into<String>) -> Self {
        Self {
            bond_denom: bond_denom.into(),
        }
    }
}

impl Default for NullStaking {
    fn default() -> Self {
        Self::new("uaxm")
    }
}

impl StakingKeeper for NullStaking {
    fn bond_denom(&self) -> Result<String, CollaboratorError> {
        Ok(self.bond_denom.clone())
    }
}
