//! Hooks called by the staking module.

use axm_types::AccountId;

use crate::{Context, Keeper, ReferralError};

pub trait RefStakingHooks {
    /// A delegator's bonded amount moved from `old` to `new`.
    fn delegation_coins_modified(
        &self,
        ctx: &Context<'_>,
        delegator: &AccountId,
        validator: &str,
        old: u128,
        new: u128,
    ) -> Result<(), ReferralError>;

    /// Only accounts in the referral structure may delegate.
    fn check_delegation_available(
        &self,
        ctx: &Context<'_>,
        delegator: &AccountId,
        validator: &str,
    ) -> Result<(), ReferralError>;

    /// Pay referral fees out of `total`, returning what is left.
    fn spend_coins_for_ref(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        total: u128,
    ) -> Result<u128, ReferralError>;
}

/// [`RefStakingHooks`] backed by a keeper.
#[derive(Clone, Copy)]
pub struct StakingHooks<'k> {
    keeper: &'k Keeper,
}

impl Keeper {
    pub fn staking_hooks(&self) -> StakingHooks<'_> {
        StakingHooks { keeper: self }
    }
}

fn signed_difference(old: u128, new: u128) -> Result<i128, ReferralError> {
    let magnitude = |v: u128| i128::try_from(v).map_err(|_| ReferralError::Overflow("stake delta"));
    if new >= old {
        magnitude(new - old)
    } else {
        Ok(-magnitude(old - new)?)
    }
}

impl RefStakingHooks for StakingHooks<'_> {
    fn delegation_coins_modified(
        &self,
        ctx: &Context<'_>,
        delegator: &AccountId,
        validator: &str,
        old: u128,
        new: u128,
    ) -> Result<(), ReferralError> {
        tracing::debug!(%delegator, validator, old, new, "delegation modified");
        let delta = signed_difference(old, new)?;
        self.keeper.on_balance_changed(ctx, delegator, delta)
    }

    fn check_delegation_available(
        &self,
        ctx: &Context<'_>,
        delegator: &AccountId,
        _validator: &str,
    ) -> Result<(), ReferralError> {
        if !self.keeper.exists(ctx, delegator)? {
            return Err(ReferralError::NotFound(delegator.clone()));
        }
        Ok(())
    }

    fn spend_coins_for_ref(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        total: u128,
    ) -> Result<u128, ReferralError> {
        self.keeper.pay_up_fees(ctx, acc, total)
    }
}
