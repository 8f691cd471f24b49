//! Delegation fee distribution among ancestors.

use serde::{Deserialize, Serialize};

use axm_types::{AccountId, Coin, Fraction, Input, Output};

use crate::{Context, Keeper, ReferralError, ReferralNotice, MAX_DEPTH};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralFee {
    pub beneficiary: AccountId,
    pub ratio: Fraction,
}

impl Keeper {
    /// Fee shares owed to `acc`'s ancestors for a delegation, plus the
    /// share nobody qualifies for, which is burned.
    pub fn get_referral_fees_for_delegating(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
    ) -> Result<(Vec<ReferralFee>, Fraction), ReferralError> {
        let params = self.params(ctx)?;
        self.referral_fees(ctx, acc, &params.delegating_award)
    }

    fn referral_fees(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        to_ancestors: &[Fraction],
    ) -> Result<(Vec<ReferralFee>, Fraction), ReferralError> {
        if to_ancestors.len() != MAX_DEPTH {
            return Err(ReferralError::InvalidParams(format!(
                "award table must have exactly {MAX_DEPTH} items ({} found)",
                to_ancestors.len()
            )));
        }
        let mut excess = Fraction::ZERO;
        let mut fees = Vec::with_capacity(MAX_DEPTH);
        let mut ancestor = self.get_parent(ctx, acc)?;
        tracing::debug!(account = %acc, start = ?ancestor, "collecting referral fees");

        for (level, share) in to_ancestors.iter().enumerate() {
            let Some(current) = ancestor.take() else {
                excess = excess
                    .checked_add(*share)
                    .ok_or(ReferralError::Overflow("burn share"))?;
                continue;
            };
            let record = self.get(ctx, &current)?;
            if level < record.status.lines_opened() {
                if !share.is_zero() {
                    fees.push(ReferralFee {
                        beneficiary: current,
                        ratio: *share,
                    });
                }
            } else {
                excess = excess
                    .checked_add(*share)
                    .ok_or(ReferralError::Overflow("burn share"))?;
            }
            ancestor = record.referrer;
        }
        Ok((fees, excess))
    }

    /// Split `total` (base units of the bond denom) taken from `acc`: burn
    /// the unassigned share, pay each qualifying ancestor in one batched
    /// transfer, and return what is left.
    pub fn pay_up_fees(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        total: u128,
    ) -> Result<u128, ReferralError> {
        let (fees, burn) = self.get_referral_fees_for_delegating(ctx, acc)?;
        let sender = self
            .codec
            .string_to_bytes(acc.as_str())
            .map_err(|e| ReferralError::InvalidAddress(e.to_string()))?;
        let denom = self.staking.bond_denom().map_err(ReferralError::Bank)?;

        let to_burn = burn.mul_floor(total);
        if to_burn > 0 {
            self.burn_coins(&sender, &[Coin::new(denom.clone(), to_burn)])?;
        }

        let mut total_fee: u128 = 0;
        let mut outputs = Vec::with_capacity(fees.len());
        for fee in fees {
            let amount = fee.ratio.mul_floor(total);
            if amount == 0 {
                continue;
            }
            total_fee = total_fee
                .checked_add(amount)
                .ok_or(ReferralError::Overflow("fee total"))?;
            let coin = Coin::new(denom.clone(), amount);
            let address = self
                .codec
                .string_to_bytes(fee.beneficiary.as_str())
                .map_err(|e| ReferralError::InvalidAddress(e.to_string()))?;
            outputs.push(Output {
                address,
                coins: vec![coin.clone()],
            });
            ctx.emit(ReferralNotice::ReferralFeePaid {
                from: acc.clone(),
                to: fee.beneficiary,
                amount: coin,
            });
        }

        if total_fee != 0 {
            let input = Input {
                address: sender,
                coins: vec![Coin::new(denom, total_fee)],
            };
            self.bank
                .input_output_coins(&input, &outputs)
                .map_err(ReferralError::Bank)?;
        }

        total
            .checked_sub(to_burn)
            .and_then(|rest| rest.checked_sub(total_fee))
            .ok_or(ReferralError::Overflow("fee remainder"))
    }

    /// Move `coins` from `sender` to the module account and burn them.
    pub fn burn_coins(&self, sender: &[u8], coins: &[Coin]) -> Result<(), ReferralError> {
        self.bank
            .send_coins_from_account_to_module(sender, &self.module_account, coins)
            .map_err(ReferralError::Bank)?;
        self.bank
            .burn_coins(&self.module_account, coins)
            .map_err(ReferralError::Bank)
    }
}
