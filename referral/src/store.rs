//! Record persistence and whole-store walks.

use axm_types::AccountId;

use crate::keys::{self, PARAMS_KEY, RECORD_PREFIX};
use crate::{AccountRecord, BunchUpdater, Context, Keeper, Params, ReferralError, Status};

impl Keeper {
    /// Load a record, `None` when the account is not in the structure.
    pub fn try_get(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
    ) -> Result<Option<AccountRecord>, ReferralError> {
        match ctx.store().get(&keys::record_key(acc))? {
            Some(bytes) => Ok(Some(AccountRecord::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<AccountRecord, ReferralError> {
        self.try_get(ctx, acc)?
            .ok_or_else(|| ReferralError::NotFound(acc.clone()))
    }

    pub fn exists(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<bool, ReferralError> {
        Ok(ctx.store().has(&keys::record_key(acc))?)
    }

    pub(crate) fn set(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        record: &AccountRecord,
    ) -> Result<(), ReferralError> {
        ctx.store().set(&keys::record_key(acc), &record.encode()?)?;
        Ok(())
    }

    pub fn get_status(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<Status, ReferralError> {
        Ok(self.get(ctx, acc)?.status)
    }

    /// Every record in account order.
    pub fn all_records(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<(AccountId, AccountRecord)>, ReferralError> {
        ctx.store()
            .prefix_iter(&[RECORD_PREFIX])?
            .into_iter()
            .map(|(key, value)| Ok((keys::parse_record_key(&key)?, AccountRecord::decode(&value)?)))
            .collect()
    }

    /// Walk every record. The callback may modify the record and reports
    /// `(changed, check_status)`; changed records are written back, and
    /// flagged ones go through the status cascade, all in one commit.
    pub fn iterate<F>(&self, ctx: &Context<'_>, mut callback: F) -> Result<(), ReferralError>
    where
        F: FnMut(&AccountId, &mut AccountRecord) -> (bool, bool),
    {
        let mut bu = BunchUpdater::new(self, ctx);
        for (acc, mut record) in self.all_records(ctx)? {
            let (changed, check_status) = callback(&acc, &mut record);
            if !(changed || check_status) {
                continue;
            }
            bu.update(&acc, check_status, |stored| {
                if changed {
                    *stored = record;
                }
                Ok(())
            })?;
        }
        bu.commit()
    }

    /// Current params, defaults when none were stored yet.
    pub fn params(&self, ctx: &Context<'_>) -> Result<Params, ReferralError> {
        match ctx.store().get(PARAMS_KEY)? {
            Some(bytes) => Params::decode(&bytes),
            None => Ok(Params::default()),
        }
    }

    pub fn set_params(&self, ctx: &Context<'_>, params: &Params) -> Result<(), ReferralError> {
        params.validate()?;
        ctx.store().set(PARAMS_KEY, &params.encode()?)?;
        tracing::info!(
            downgrade_period_secs = params.status_downgrade_period_secs,
            "referral params updated"
        );
        Ok(())
    }
}
