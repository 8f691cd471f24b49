//! Stake changes and the activity cascade.

use axm_types::{apply_delta, AccountId};

use crate::requirements::GURU_MIN_X_PARAMETER;
use crate::{ActiveAggregations, BunchUpdater, Context, Keeper, ReferralError, ReferralHook};

/// Self-delegated stake (base units) at which an account becomes active.
pub const ACTIVATION_THRESHOLD: u128 = 100_000_000;

/// Ancestor levels reached by activity counters and delegation fees.
pub const MAX_DEPTH: usize = 14;

/// Move `delta` in/out of the team bucket matching `team_size`.
pub fn change_team_active(agg: &mut ActiveAggregations, team_size: u64, delta: i64) {
    let bucket = match team_size {
        0..=14 => &mut agg.team0,
        15..=49 => &mut agg.team15,
        50..=99 => &mut agg.team50,
        100..=299 => &mut agg.team100,
        _ => &mut agg.team300,
    };
    *bucket += delta;
}

fn shift(counter: u64, delta: i64) -> Result<u64, ReferralError> {
    let next = if delta >= 0 {
        counter.checked_add(delta.unsigned_abs())
    } else {
        counter.checked_sub(delta.unsigned_abs())
    };
    next.ok_or(ReferralError::Overflow("active referral counter"))
}

/// What the parent step needs to know about the account that flipped.
struct Flipped {
    referrer: Option<AccountId>,
    team_size: u64,
    first_line: i64,
}

impl Keeper {
    /// React to `acc`'s self-delegated stake changing by `delta`.
    ///
    /// Accounts outside the structure are ignored. The delta is added to
    /// `team_delegated` of every ancestor up to the root; crossing
    /// [`ACTIVATION_THRESHOLD`] runs the activity cascade.
    pub fn on_balance_changed(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        delta: i128,
    ) -> Result<(), ReferralError> {
        tracing::debug!(account = %acc, delta, "balance changed");
        let mut bu = BunchUpdater::new(self, ctx);

        let outcome = bu
            .update(acc, true, |rec| {
                let delegated = apply_delta(rec.self_delegated, delta)
                    .ok_or(ReferralError::Overflow("self delegation"))?;
                let active = delegated >= ACTIVATION_THRESHOLD;
                rec.self_delegated = delegated;
                Ok(((active != rec.active).then_some(active), rec.referrer.clone()))
            })
            .inspect_err(|e| {
                tracing::error!(account = %acc, step = 0, error = %e, "balance change hook failed")
            })?;
        let Some((flip, mut node)) = outcome else {
            tracing::debug!(account = %acc, "account is out of the referral");
            return Ok(());
        };
        if delta != 0 {
            bu.add_callback(acc.clone(), ReferralHook::StakeChanged);
        }

        let mut step = 1usize;
        while let Some(ancestor) = node.take() {
            node = bu
                .update(&ancestor, true, |rec| {
                    rec.team_delegated = apply_delta(rec.team_delegated, delta)
                        .ok_or(ReferralError::Overflow("team delegation"))?;
                    Ok(rec.referrer.clone())
                })
                .inspect_err(|e| {
                    tracing::error!(account = %acc, step, error = %e, "balance change hook failed")
                })?
                .flatten();
            if delta != 0 {
                bu.add_callback(ancestor, ReferralHook::StakeChanged);
            }
            step += 1;
        }

        if let Some(active) = flip {
            set_active(&mut bu, acc, active, true).inspect_err(|e| {
                tracing::error!(account = %acc, step = "set active", error = %e, "balance change hook failed")
            })?;
        }

        bu.commit().inspect_err(|e| {
            tracing::error!(account = %acc, step = "commit", error = %e, "balance change hook failed")
        })
    }
}

/// Flip `acc`'s activity and propagate it to its ancestors.
///
/// No-op when the flag already has the requested value. The parent's
/// aggregates are updated directly, the grandparent's "three by three"
/// counter when the parent crosses the three-active-referrals border, and
/// generation counters on up to [`MAX_DEPTH`] ancestors. With
/// `check_ancestors` every touched ancestor goes through the status cascade.
pub fn set_active(
    bu: &mut BunchUpdater<'_>,
    acc: &AccountId,
    active: bool,
    check_ancestors: bool,
) -> Result<(), ReferralError> {
    tracing::debug!(account = %acc, active, check_ancestors, "set active");
    let delta: i64 = if active { 1 } else { -1 };

    let flipped = bu.update(acc, false, |rec| {
        if rec.active == active {
            return Ok(None);
        }
        rec.active = active;
        rec.active_ref_counts[0] = shift(rec.active_ref_counts[0], delta)?;
        Ok(Some(Flipped {
            referrer: rec.referrer.clone(),
            team_size: rec.active_team_size(),
            first_line: rec.active_count.first_line,
        }))
    })?;
    let Some(child) = flipped.flatten() else {
        return Ok(());
    };
    let Some(parent) = child.referrer else {
        return Ok(());
    };

    let ripple = bu
        .update(&parent, check_ancestors, |rec| {
            let agg = &mut rec.active_count;
            change_team_active(agg, child.team_size, delta);
            agg.first_line += delta;
            if child.first_line >= GURU_MIN_X_PARAMETER {
                agg.first_line_by3 += delta;
            }

            if !rec.active {
                return Ok(None);
            }
            let border = if active {
                rec.active_count.first_line == GURU_MIN_X_PARAMETER
            } else {
                rec.active_count.first_line == GURU_MIN_X_PARAMETER - 1
            };
            Ok(border.then(|| rec.referrer.clone()).flatten())
        })?
        .flatten();
    if let Some(grandparent) = ripple {
        bu.update(&grandparent, check_ancestors, |rec| {
            rec.active_count.first_line_by3 += delta;
            Ok(())
        })?;
    }

    let mut cursor = Some(parent);
    for level in 0..MAX_DEPTH {
        let Some(ancestor) = cursor.take() else {
            break;
        };
        let walked = bu.update(&ancestor, check_ancestors, |rec| {
            let before = rec.active_team_size();
            rec.active_ref_counts[level + 1] = shift(rec.active_ref_counts[level + 1], delta)?;
            let after = rec.active_team_size();
            let moved = (rec.active && before != after).then_some((before, after));
            Ok((rec.referrer.clone(), moved))
        })?;
        let Some((next, moved)) = walked else {
            break;
        };

        if let (Some(next), Some((before, after))) = (&next, moved) {
            bu.update(next, check_ancestors, |rec| {
                change_team_active(&mut rec.active_count, before, -1);
                change_team_active(&mut rec.active_count, after, 1);
                Ok(())
            })?;
        }
        cursor = next;
    }
    Ok(())
}
