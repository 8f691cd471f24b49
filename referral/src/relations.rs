//! The referral forest: registration and parent/child lookups.

use axm_types::AccountId;

use crate::keys::{self, MARKER, RECORD_PREFIX};
use crate::{
    AccountRecord, BunchUpdater, Context, Keeper, ReferralError, ReferralHook, Status, MAX_DEPTH,
};

impl Keeper {
    /// Accounts without a referrer, in account order.
    pub fn get_top_level_accounts(&self, ctx: &Context<'_>) -> Result<Vec<AccountId>, ReferralError> {
        let mut top = Vec::new();
        for (key, value) in ctx.store().prefix_iter(&[RECORD_PREFIX])? {
            if AccountRecord::decode(&value)?.is_top_level() {
                top.push(keys::parse_record_key(&key)?);
            }
        }
        Ok(top)
    }

    /// Insert a root of the forest.
    pub fn add_top_level_account(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        status: Status,
    ) -> Result<(), ReferralError> {
        tracing::debug!(account = %acc, %status, "add top level account");
        if self.exists(ctx, acc)? {
            return Err(ReferralError::AlreadyExists(acc.clone()));
        }
        let mut bu = BunchUpdater::new(self, ctx);
        bu.set(acc, AccountRecord::new(None, status));
        bu.commit()
    }

    /// Register `child` under the existing `parent`.
    pub fn append_child(
        &self,
        ctx: &Context<'_>,
        parent: &AccountId,
        child: &AccountId,
    ) -> Result<(), ReferralError> {
        tracing::debug!(%parent, %child, "append child");
        if self.exists(ctx, child)? {
            return Err(ReferralError::AlreadyExists(child.clone()));
        }
        if !self.exists(ctx, parent)? {
            return Err(ReferralError::ParentNotFound(parent.clone()));
        }

        let mut bu = BunchUpdater::new(self, ctx);
        bu.set(child, AccountRecord::new(Some(parent.clone()), Status::New));

        let mut ancestor = bu
            .update(parent, true, |rec| Ok(rec.referrer.clone()))?
            .flatten();
        ctx.store().set(&keys::relation_key(parent, child), MARKER)?;
        bu.add_callback(parent.clone(), ReferralHook::StakeChanged);

        // the new account holds no stake yet, so ancestors only get
        // re-evaluated and notified
        for _ in 1..MAX_DEPTH {
            let Some(current) = ancestor.take() else {
                break;
            };
            ancestor = bu
                .update(&current, true, |rec| Ok(rec.referrer.clone()))?
                .flatten();
            bu.add_callback(current, ReferralHook::StakeChanged);
        }

        bu.commit()
    }

    pub fn get_parent(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
    ) -> Result<Option<AccountId>, ReferralError> {
        Ok(self.get(ctx, acc)?.referrer)
    }

    /// Direct referrals of `acc`, in account order.
    pub fn get_children(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<Vec<AccountId>, ReferralError> {
        ctx.store()
            .prefix_iter(&keys::children_prefix(acc))?
            .into_iter()
            .map(|(key, _)| keys::parse_relation_key(&key).map(|(_, child)| child))
            .collect()
    }
}
