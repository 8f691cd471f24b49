//! Buffered multi-account updates.
//!
//! A [`BunchUpdater`] collects record writes and hook callbacks while a
//! cascade walks the forest, then applies everything in one
//! [`commit`](BunchUpdater::commit):
//!
//! ```ignore
//! let mut bu = BunchUpdater::new(&keeper, &ctx);
//! bu.update(&acc, true, |rec| { rec.self_delegated += 1; Ok(()) })?;
//! bu.add_callback(acc.clone(), ReferralHook::StakeChanged);
//! bu.commit()?;
//! ```
//!
//! Dropping the updater without committing discards the buffered records.
//! Downgrade queue entries are written straight to the store, so the host's
//! transaction branch is what makes a failed cascade leave no trace.

use std::collections::BTreeMap;

use axm_types::AccountId;

use crate::{
    check_requirements, AccountRecord, Context, Keeper, ReferralError, ReferralHook,
    ReferralNotice, UpdatePhase,
};

pub struct BunchUpdater<'a> {
    keeper: &'a Keeper,
    ctx: &'a Context<'a>,
    pending: BTreeMap<AccountId, AccountRecord>,
    callbacks: Vec<(AccountId, ReferralHook)>,
}

impl<'a> BunchUpdater<'a> {
    pub fn new(keeper: &'a Keeper, ctx: &'a Context<'a>) -> Self {
        Self {
            keeper,
            ctx,
            pending: BTreeMap::new(),
            callbacks: Vec::new(),
        }
    }

    pub fn context(&self) -> &'a Context<'a> {
        self.ctx
    }

    /// Buffered value, else the stored one.
    pub fn get(&self, acc: &AccountId) -> Result<Option<AccountRecord>, ReferralError> {
        if let Some(record) = self.pending.get(acc) {
            return Ok(Some(record.clone()));
        }
        self.keeper.try_get(self.ctx, acc)
    }

    /// Buffer a record, replacing any earlier write of the same account.
    pub fn set(&mut self, acc: &AccountId, record: AccountRecord) {
        self.pending.insert(acc.clone(), record);
    }

    /// Read-modify-write one record.
    ///
    /// Returns `Ok(None)` without touching anything when the account does
    /// not exist. With `check_status` the status cascade runs after the
    /// mutation. Failures are wrapped with the account and phase, except
    /// resource exhaustion.
    pub fn update<T, F>(
        &mut self,
        acc: &AccountId,
        check_status: bool,
        mutate: F,
    ) -> Result<Option<T>, ReferralError>
    where
        F: FnOnce(&mut AccountRecord) -> Result<T, ReferralError>,
    {
        let loaded = self
            .get(acc)
            .map_err(|e| e.wrap_update(acc, UpdatePhase::Load))?;
        let Some(mut record) = loaded else {
            tracing::info!(account = %acc, "cannot update, no such account");
            return Ok(None);
        };
        record.normalize();

        let out = mutate(&mut record).map_err(|e| e.wrap_update(acc, UpdatePhase::Mutate))?;

        if check_status {
            self.refresh_status(acc, &mut record)
                .map_err(|e| e.wrap_update(acc, UpdatePhase::StatusCheck))?;
        }

        self.set(acc, record);
        Ok(Some(out))
    }

    pub fn add_callback(&mut self, acc: AccountId, hook: ReferralHook) {
        self.callbacks.push((acc, hook));
    }

    /// Schedule, cancel or promote according to the current requirements.
    fn refresh_status(
        &mut self,
        acc: &AccountId,
        record: &mut AccountRecord,
    ) -> Result<(), ReferralError> {
        let ctx = self.ctx;

        if !check_requirements(record.status, record).overall {
            if record.status_downgrade_at.is_none() {
                let period = self.keeper.params(ctx)?.status_downgrade_period_secs;
                let at = ctx
                    .block_time()
                    .checked_add_secs(period)
                    .ok_or(ReferralError::Overflow("downgrade time"))?;
                self.keeper.schedule_status_downgrade(ctx, acc, at)?;
                record.status_downgrade_at = Some(at);
                ctx.emit(ReferralNotice::StatusWillBeDowngraded {
                    account: acc.clone(),
                    at,
                });
            }
            return Ok(());
        }

        if let Some(at) = record.status_downgrade_at.take() {
            self.keeper.remove_status_downgrade_schedule(ctx, acc, at)?;
            ctx.emit(ReferralNotice::StatusDowngradeCanceled {
                account: acc.clone(),
            });
        }

        let mut reached = record.status;
        while let Some(candidate) = reached.next() {
            if !check_requirements(candidate, record).overall {
                break;
            }
            reached = candidate;
        }

        if reached > record.status {
            ctx.emit(ReferralNotice::StatusUpdated {
                account: acc.clone(),
                before: record.status,
                after: reached,
            });
            record.status = reached;
            self.add_callback(acc.clone(), ReferralHook::StatusUpdated);
        }
        Ok(())
    }

    /// Flush buffered records, then fire each distinct `(account, hook)`
    /// once, sorted by account then hook. A failing listener aborts the rest;
    /// records already flushed stay written.
    pub fn commit(self) -> Result<(), ReferralError> {
        let Self {
            keeper,
            ctx,
            pending,
            mut callbacks,
        } = self;

        for (acc, record) in &pending {
            keeper.set(ctx, acc, record)?;
        }

        callbacks.sort();
        callbacks.dedup();
        for (acc, hook) in callbacks {
            keeper.hooks.dispatch(hook, ctx, &acc).map_err(|e| {
                if e.is_fatal() {
                    e
                } else {
                    ReferralError::Callback {
                        event: hook,
                        account: acc.clone(),
                        source: Box::new(e),
                    }
                }
            })?;
        }
        Ok(())
    }
}
