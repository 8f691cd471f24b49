//! Time-indexed status downgrade queue.

use axm_types::{AccountId, Timestamp};

use crate::keys::{self, DOWNGRADE_PREFIX, MARKER};
use crate::{BunchUpdater, Context, Keeper, ReferralError, ReferralHook, ReferralNotice};

impl Keeper {
    pub fn schedule_status_downgrade(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        at: Timestamp,
    ) -> Result<(), ReferralError> {
        ctx.store().set(&keys::downgrade_key(at, acc), MARKER)?;
        Ok(())
    }

    pub fn remove_status_downgrade_schedule(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        at: Timestamp,
    ) -> Result<(), ReferralError> {
        ctx.store().delete(&keys::downgrade_key(at, acc))?;
        Ok(())
    }

    /// Queue entries in time order, `(time, account)`.
    pub fn scheduled_downgrades(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<(Timestamp, AccountId)>, ReferralError> {
        ctx.store()
            .prefix_iter(&[DOWNGRADE_PREFIX])?
            .into_iter()
            .map(|(key, _)| keys::parse_downgrade_key(&key))
            .collect()
    }

    /// Drain every entry due at the context's block time, oldest first.
    /// Returns how many entries were processed.
    pub fn perform_status_downgrade_schedule(&self, ctx: &Context<'_>) -> Result<usize, ReferralError> {
        let end = keys::downgrade_queue_end(ctx.block_time());
        let due = ctx.store().range(&[DOWNGRADE_PREFIX], Some(&end))?;
        let count = due.len();

        for (key, _) in due {
            let (_, acc) = keys::parse_downgrade_key(&key)?;
            tracing::info!(account = %acc, "downgrade status");
            // removed first: a zero grace period may re-queue under the same key
            ctx.store().delete(&key)?;
            self.perform_downgrade(ctx, &acc)?;
        }
        Ok(count)
    }

    /// Block-begin processing.
    pub fn begin_block(&self, ctx: &Context<'_>) -> Result<(), ReferralError> {
        let processed = self.perform_status_downgrade_schedule(ctx)?;
        if processed > 0 {
            tracing::debug!(processed, time = %ctx.block_time(), "status downgrade queue drained");
        }
        Ok(())
    }

    /// Step `acc` down one tier if its scheduled downgrade is due. An
    /// account that recovered in the meantime has no schedule and is left
    /// alone. Tiers never drop below [`Status::MIN`](crate::Status::MIN).
    fn perform_downgrade(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<(), ReferralError> {
        tracing::debug!(account = %acc, "perform downgrade");
        let now = ctx.block_time();
        let mut bu = BunchUpdater::new(self, ctx);

        let downgraded = bu.update(acc, true, |rec| {
            match rec.status_downgrade_at {
                Some(at) if !at.is_after(now) => {}
                _ => return Ok(false),
            }
            rec.status_downgrade_at = None;
            let Some(lower) = rec.status.prev() else {
                return Ok(false);
            };
            ctx.emit(ReferralNotice::StatusUpdated {
                account: acc.clone(),
                before: rec.status,
                after: lower,
            });
            rec.status = lower;
            Ok(true)
        })?;

        if downgraded == Some(true) {
            bu.add_callback(acc.clone(), ReferralHook::StatusUpdated);
        }
        bu.commit()
    }
}
