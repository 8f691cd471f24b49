//! Transaction messages.

use serde::{Deserialize, Serialize};

use crate::{Context, Keeper, Params, ReferralError};

/// Register `referral` under `referrer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterReferral {
    pub referrer: String,
    pub referral: String,
}

/// Replace the module params. Only the configured authority may send it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: String,
    pub params: Params,
}

impl Keeper {
    pub fn register_referral(
        &self,
        ctx: &Context<'_>,
        msg: &MsgRegisterReferral,
    ) -> Result<(), ReferralError> {
        if msg.referrer.is_empty() {
            return Err(ReferralError::InvalidParent);
        }
        let referrer = self.parse_address(&msg.referrer)?;
        let referral = self.parse_address(&msg.referral)?;
        if !self.exists(ctx, &referrer)? {
            return Err(ReferralError::ParentNotFound(referrer));
        }
        self.append_child(ctx, &referrer, &referral)
    }

    pub fn update_params(&self, ctx: &Context<'_>, msg: &MsgUpdateParams) -> Result<(), ReferralError> {
        if msg.authority != self.authority.as_str() {
            return Err(ReferralError::Unauthorized {
                expected: self.authority.to_string(),
                got: msg.authority.clone(),
            });
        }
        self.set_params(ctx, &msg.params)
    }
}
